//! Parse `helm list` output into a release map.

use crate::types::ReleaseMap;
use atlas_parsers::split_columns;

/// Parse `helm list` output.
///
/// helm prints a whitespace-aligned table whose first column is the release
/// name and whose last column is the namespace:
///
/// ```text
/// NAME     REVISION  UPDATED                   STATUS    CHART        APP VERSION  NAMESPACE
/// tf-dist  1         Mon Oct 15 10:00:00 2018  DEPLOYED  tfjob-0.1.0  1.0          default
/// ```
///
/// The header row, blank lines, and lines with a single column are skipped.
pub fn parse_release_list(output: &str) -> ReleaseMap {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match split_columns(line, 2) {
            Ok(cols) if cols[0] == "NAME" => None,
            Ok(cols) => {
                let name = cols[0].to_string();
                let namespace = cols[cols.len() - 1].to_string();
                tracing::debug!("release {} in namespace {}", name, namespace);
                Some((name, namespace))
            }
            Err(e) => {
                tracing::debug!("skipping helm list line: {}", e);
                None
            }
        })
        .collect()
}
