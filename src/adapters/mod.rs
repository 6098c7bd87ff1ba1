// Adapters layer: concrete implementations for external systems
// (SweCRIS, DMPonline, local files, the run log).

pub mod dmponline;
pub mod run_log;
pub mod storage;
pub mod swecris;

/// Joins an API base URL and a relative path with exactly one slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::join_url;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://dmponline.example/api/v1/", "plans"),
            "https://dmponline.example/api/v1/plans"
        );
        assert_eq!(
            join_url("https://swecris-api.vr.se/v1/projects", "2021-04241_VR"),
            "https://swecris-api.vr.se/v1/projects/2021-04241_VR"
        );
    }
}
