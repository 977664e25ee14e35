//! Target collection and address normalization.

use std::collections::HashSet;

use log::info;

use crate::lines::service_trait::LineSource;

/// Deduplicating collector for attack targets, preserving first-seen order.
pub struct TargetList {
    seen: HashSet<String>,
    targets: Vec<String>,
}

impl TargetList {
    pub fn new() -> Self {
        TargetList {
            seen: HashSet::new(),
            targets: Vec::new(),
        }
    }

    /// Adds one target, skipping blanks and repeats.
    ///
    /// * `target` - Host, host:port, or bracketed IPv6 form.
    pub fn add(&mut self, target: &str) {
        if target.is_empty() {
            info!("Ignoring blank host");
            return;
        }
        if !self.seen.insert(target.to_string()) {
            info!("Ignoring duplicate target {}", target);
            return;
        }
        self.targets.push(target.to_string());
    }

    /// Collects targets from a hosts file, one per line. Blank lines and
    /// `#` comments are skipped.
    pub async fn extend_from(
        &mut self,
        source: &mut impl LineSource,
    ) -> Result<(), std::io::Error> {
        while let Some(line) = source.next_line().await? {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.add(line);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.targets
    }
}

/// Appends the default port to targets that lack one.
///
/// Bare IPv6 addresses are wrapped in brackets so the port is
/// unambiguous.
///
/// * `target`       - Target as given on the command line or hosts file.
/// * `default_port` - Port to use when the target names none.
pub fn ensure_port(target: &str, default_port: u16) -> String {
    if let Some(rest) = target.strip_prefix('[') {
        if rest.contains("]:") {
            return target.to_string();
        }
        return format!("{}:{}", target, default_port);
    }
    match target.matches(':').count() {
        0 => format!("{}:{}", target, default_port),
        1 => target.to_string(),
        _ => format!("[{}]:{}", target, default_port),
    }
}

#[cfg(test)]
mod tests {
    use crate::attacker::target::{ensure_port, TargetList};
    use crate::lines::service::MemoryLineSource;

    #[test]
    fn ports_are_defaulted_only_when_missing() {
        assert_eq!(ensure_port("vnc.example.com", 5900), "vnc.example.com:5900");
        assert_eq!(ensure_port("10.0.0.9:5901", 5900), "10.0.0.9:5901");
        assert_eq!(ensure_port("::1", 5900), "[::1]:5900");
        assert_eq!(ensure_port("[::1]", 5900), "[::1]:5900");
        assert_eq!(ensure_port("[::1]:5901", 5900), "[::1]:5901");
    }

    #[test]
    fn targets_are_deduplicated_in_order() {
        let mut list = TargetList::new();
        list.add("one");
        list.add("two");
        list.add("one");
        list.add("");

        assert_eq!(list.len(), 2);
        assert_eq!(list.into_vec(), vec!["one", "two"]);
    }

    #[actix_rt::test]
    async fn hosts_files_allow_comments_and_blanks() {
        let mut list = TargetList::new();
        list.add("cli-target");

        let mut hosts = MemoryLineSource::new(&[
            "# staging scanners",
            "",
            "  10.0.0.4  ",
            "cli-target",
            "10.0.0.5:5901",
        ]);
        list.extend_from(&mut hosts).await.unwrap();

        assert_eq!(
            list.into_vec(),
            vec!["cli-target", "10.0.0.4", "10.0.0.5:5901"]
        );
    }
}
