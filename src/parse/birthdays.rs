//! Flattening of the birthdays widget buckets.

use crate::educamos::models::{RawBirthdayPerson, RawBirthdaysResponse};
use crate::models::Birthday;

/// Flatten the today/tomorrow/upcoming buckets into one labeled list,
/// preserving bucket order.
pub fn normalize_birthdays(raw: RawBirthdaysResponse) -> Vec<Birthday> {
    let mut out = Vec::new();
    bucket(&mut out, raw.hoy, "hoy", "Hoy");
    bucket(&mut out, raw.mannana, "manana", "Mañana");
    bucket(&mut out, raw.proximamente, "proximamente", "Próximamente");
    out
}

fn bucket(out: &mut Vec<Birthday>, people: Vec<RawBirthdayPerson>, prefix: &str, label: &str) {
    for (idx, person) in people.into_iter().enumerate() {
        out.push(Birthday {
            id: format!("{prefix}-{idx}"),
            name: person.nombre_apellido,
            date: label.to_string(),
            avatar: person.url_foto.filter(|u| !u.is_empty()),
            class: person.clases.into_iter().next(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn buckets_flatten_in_order_with_labels() {
        let raw: RawBirthdaysResponse = serde_json::from_value(json!({
            "personaCumpleannosHoy": [
                { "nombreApellido": "Lucía Pérez", "urlFoto": "/f/1.jpg", "alumnoClasesNombres": ["4º ESO B"] }
            ],
            "personaCumpleannosMannana": [],
            "personaCumpleannosProximamente": [
                { "nombreApellido": "Hugo Díaz", "urlFoto": "", "alumnoClasesNombres": [] },
                { "nombreApellido": "Vera Sanz" }
            ]
        }))
        .unwrap();

        let birthdays = normalize_birthdays(raw);
        assert_eq!(birthdays.len(), 3);
        assert_eq!(birthdays[0].id, "hoy-0");
        assert_eq!(birthdays[0].date, "Hoy");
        assert_eq!(birthdays[0].class.as_deref(), Some("4º ESO B"));
        assert_eq!(birthdays[1].id, "proximamente-0");
        assert!(birthdays[1].avatar.is_none());
        assert_eq!(birthdays[2].id, "proximamente-1");
        assert_eq!(birthdays[2].date, "Próximamente");
    }
}
