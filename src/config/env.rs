// src/config/env.rs

//! Parent/child propagation for nested cronner invocations.
//!
//! A cronner that wraps a script which itself calls cronner exports a few
//! `CRONNER_PARENT_*` variables to its child. The inner cronner turns them
//! into tags so its events and metrics can be tied back to the outer run.

/// Recognised variables, in tag order. The first one gates the rest.
pub const PARENT_UUID: &str = "CRONNER_PARENT_UUID";
pub const PARENT_EVENT_GROUP: &str = "CRONNER_PARENT_EVENT_GROUP";
pub const PARENT_GROUP: &str = "CRONNER_PARENT_GROUP";
pub const PARENT_NAMESPACE: &str = "CRONNER_PARENT_NAMESPACE";
pub const PARENT_LABEL: &str = "CRONNER_PARENT_LABEL";

pub const PARENT_VARS: [&str; 5] = [
    PARENT_UUID,
    PARENT_EVENT_GROUP,
    PARENT_GROUP,
    PARENT_NAMESPACE,
    PARENT_LABEL,
];

/// Tags derived from the parent's environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentEnv {
    /// `(variable, value)` for every recognised, non-empty variable.
    vars: Vec<(&'static str, String)>,
}

impl ParentEnv {
    /// Read the recognised variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ParentEnv::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(PARENT_UUID) {
            Some(uuid) if !uuid.is_empty() => {}
            _ => return Self::default(),
        }

        let vars = PARENT_VARS
            .iter()
            .filter_map(|&key| match lookup(key) {
                Some(value) if !value.is_empty() => Some((key, value)),
                _ => None,
            })
            .collect();

        Self { vars }
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// All parent tags, lowercased `key:value`.
    pub fn event_tags(&self) -> Vec<String> {
        self.vars.iter().map(|(k, v)| to_tag(k, v)).collect()
    }

    /// Parent tags minus the parent UUID, which would explode metric
    /// cardinality.
    pub fn metric_tags(&self) -> Vec<String> {
        self.vars
            .iter()
            .filter(|(k, _)| *k != PARENT_UUID)
            .map(|(k, v)| to_tag(k, v))
            .collect()
    }
}

fn to_tag(key: &str, value: &str) -> String {
    format!("{key}:{value}").to_lowercase()
}

/// Variables handed to the child so a nested cronner sees us as its parent.
pub fn child_env(
    correlation_id: &str,
    event_group: Option<&str>,
    metric_group: Option<&str>,
    namespace: &str,
    label: &str,
) -> Vec<(&'static str, String)> {
    vec![
        (PARENT_UUID, correlation_id.to_string()),
        (PARENT_EVENT_GROUP, event_group.unwrap_or_default().to_string()),
        (PARENT_GROUP, metric_group.unwrap_or_default().to_string()),
        (PARENT_NAMESPACE, namespace.to_string()),
        (PARENT_LABEL, label.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_uuid_disables_everything() {
        let env = ParentEnv::from_lookup(lookup_from(&[
            (PARENT_LABEL, "outer"),
            (PARENT_NAMESPACE, "ns"),
        ]));
        assert!(env.is_empty());
        assert!(env.event_tags().is_empty());
    }

    #[test]
    fn empty_uuid_disables_everything() {
        let env = ParentEnv::from_lookup(lookup_from(&[(PARENT_UUID, ""), (PARENT_LABEL, "x")]));
        assert!(env.is_empty());
    }

    #[test]
    fn tags_are_ordered_lowercased_and_skip_empty_values() {
        let env = ParentEnv::from_lookup(lookup_from(&[
            (PARENT_UUID, "ABC-123"),
            (PARENT_EVENT_GROUP, ""),
            (PARENT_GROUP, "Batch"),
            (PARENT_LABEL, "Outer_Job"),
        ]));

        assert_eq!(
            env.event_tags(),
            vec![
                "cronner_parent_uuid:abc-123",
                "cronner_parent_group:batch",
                "cronner_parent_label:outer_job",
            ]
        );
        assert_eq!(
            env.metric_tags(),
            vec!["cronner_parent_group:batch", "cronner_parent_label:outer_job"]
        );
    }

    #[test]
    fn child_env_round_trips_through_lookup() {
        let vars = child_env("id-1", Some("ev"), None, "cronner", "job");
        let map: HashMap<&str, String> = vars.into_iter().collect();

        let env = ParentEnv::from_lookup(|k| map.get(k).cloned());
        assert_eq!(
            env.event_tags(),
            vec![
                "cronner_parent_uuid:id-1",
                "cronner_parent_event_group:ev",
                "cronner_parent_namespace:cronner",
                "cronner_parent_label:job",
            ]
        );
    }
}
