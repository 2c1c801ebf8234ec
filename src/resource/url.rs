//! URL construction for ARM endpoints
//!
//! Structural only: segments are joined as given and never escaped.

/// Builds subscription-scoped, version-stamped ARM URLs for one resource type
#[derive(Debug, Clone, Copy)]
pub struct UrlBuilder<'a> {
    pub endpoint: &'a str,
    pub subscription_id: &'a str,
    pub provider: &'a str,
    pub resource_type: &'a str,
    pub api_version: &'a str,
}

impl<'a> UrlBuilder<'a> {
    /// `<endpoint>/subscriptions/<sub>[/resourceGroups/<group>]/providers/<ns>/<type>[/<segment>...]?api-version=<v>`
    pub fn build_url(&self, resource_group: Option<&str>, segments: &[&str]) -> String {
        let mut url = format!(
            "{}/subscriptions/{}",
            self.endpoint.trim_end_matches('/'),
            self.subscription_id
        );

        if let Some(group) = resource_group {
            join_segment(&mut url, "resourceGroups");
            join_segment(&mut url, group);
        }

        join_segment(&mut url, "providers");
        join_segment(&mut url, self.provider);
        join_segment(&mut url, self.resource_type);

        for segment in segments {
            join_segment(&mut url, segment);
        }

        url.push_str("?api-version=");
        url.push_str(self.api_version);
        url
    }
}

/// Append with exactly one separator at the boundary
fn join_segment(url: &mut String, segment: &str) {
    match (url.ends_with('/'), segment.starts_with('/')) {
        (true, true) => url.push_str(&segment[1..]),
        (false, false) => {
            url.push('/');
            url.push_str(segment);
        },
        _ => url.push_str(segment),
    }
}
