/// Interpret an optional string (typically the value of a `BPG_*` environment variable) as a boolean flag.
///
/// Accepts the usual spellings in either case: `1`/`0`, `true`/`false`, `yes`/`no`, `y`/`n`, `on`/`off`. Anything
/// else, including an unset variable, yields `default`.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => true,
        "0" | "false" | "no" | "n" | "off" => false,
        _ => default,
    }
}
