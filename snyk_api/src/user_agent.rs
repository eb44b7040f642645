/// User agent sent when the caller does not configure one.
pub fn get_user_agent() -> String {
    format!(
        "snyk-api-rs/{} (+https://docs.snyk.io/snyk-api)",
        env!("CARGO_PKG_VERSION")
    )
}
