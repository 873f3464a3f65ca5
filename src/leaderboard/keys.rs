/// Key layout for one leaderboard namespace.
///
/// - `{ns}:global`        ranked set of every member
/// - `{ns}:user:entities` field map member → group
/// - `{ns}:entity:{tag}`  ranked set of the members of one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyspace {
    global: String,
    directory: String,
    group_prefix: String,
}

impl Keyspace {
    pub fn new(namespace: &str) -> Self {
        Self {
            global: format!("{}:global", namespace),
            directory: format!("{}:user:entities", namespace),
            group_prefix: format!("{}:entity:", namespace),
        }
    }

    pub fn global(&self) -> &str {
        &self.global
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn group(&self, tag: &str) -> String {
        format!("{}{}", self.group_prefix, tag)
    }

    pub fn group_prefix(&self) -> &str {
        &self.group_prefix
    }
}
