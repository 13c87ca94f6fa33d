//! Label and field selectors for list calls.

use kube::api::ListParams;

/// Selector applied to a list call. Empty means "everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub labels: Option<String>,
    pub fields: Option<String>,
}

impl ListFilter {
    /// No filtering.
    pub fn all() -> Self {
        Self::default()
    }

    /// Objects labelled `release=<name>`.
    pub fn release(name: &str) -> Self {
        Self {
            labels: Some(format!("release={name}")),
            fields: None,
        }
    }

    /// Events whose involved object is a pod.
    pub fn pod_events() -> Self {
        Self {
            labels: None,
            fields: Some("involvedObject.kind=Pod".to_string()),
        }
    }

    pub fn to_list_params(&self) -> ListParams {
        let mut params = ListParams::default();
        if let Some(labels) = &self.labels {
            params = params.labels(labels);
        }
        if let Some(fields) = &self.fields {
            params = params.fields(fields);
        }
        params
    }
}
