use uuid::Uuid;

/// True when `value` parses as a UUID (hyphenated, simple, braced or URN).
pub fn is_uuid(value: &str) -> bool {
    Uuid::try_parse(value).is_ok()
}
