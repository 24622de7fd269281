/// HTTP endpoint paths of the storage node feed API.
pub mod endpoints {
    /// POST: create a feed manifest. GET with owner/topic: resolve.
    pub const MANIFESTS: &str = "/v1/manifests";
    /// POST: publish an update. GET: lookup the latest update.
    /// Interpolated as `/v1/feeds/{owner}/{topic}`.
    pub const FEEDS: &str = "/v1/feeds";
    /// GET `/v1/tags/{id}`: sync tag status.
    pub const TAGS: &str = "/v1/tags";
    /// GET: node liveness.
    pub const HEALTH: &str = "/v1/health";
}

/// Path of the feed resource for one (owner, topic) pair.
pub fn feed_path(owner_hex: &str, topic_hex: &str) -> String {
    format!("{}/{}/{}", endpoints::FEEDS, owner_hex, topic_hex)
}

/// Path of one sync tag resource.
pub fn tag_path(tag: u64) -> String {
    format!("{}/{}", endpoints::TAGS, tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        assert_eq!(endpoints::FEEDS, "/v1/feeds");
        assert_eq!(endpoints::MANIFESTS, "/v1/manifests");
        assert_eq!(endpoints::HEALTH, "/v1/health");
    }

    #[test]
    fn feed_path_interpolation() {
        assert_eq!(feed_path("aa", "bb"), "/v1/feeds/aa/bb");
    }

    #[test]
    fn tag_path_interpolation() {
        assert_eq!(tag_path(42), "/v1/tags/42");
    }
}
