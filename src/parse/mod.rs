//! Response parsers: upstream HTML fragments, JS bootstrap scripts, and raw
//! JSON payloads in, normalized domain records out.
//!
//! Every parser here is tolerant by construction. Educamos ships markup
//! changes without notice, so a malformed row is skipped rather than failing
//! the whole response, and absent optional fields degrade to empty strings
//! or `None`. The only hard failures are structural: a missing anchor that
//! doubles as the session-validity signal, or a payload that is not the
//! document family we asked for.

pub mod announcements;
pub mod birthdays;
pub mod circulars;
pub mod context;
pub mod counters;
pub mod dates;
pub mod grades;
pub mod html;
pub mod incidents;
pub mod object_literal;
pub mod schedule;
pub mod tasks;
pub mod user_info;
