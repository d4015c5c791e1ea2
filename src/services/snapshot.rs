use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::models::StandingRow;

/// Writes the standings as pretty JSON, creating parent directories as needed.
pub fn write_standings_snapshot(path: &Path, rows: &[StandingRow]) -> Result<()> {
    if path.is_dir() {
        anyhow::bail!("Snapshot path {} is a directory", path.display());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create snapshot dir {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(rows).context("Failed to serialize standings")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
    info!("Wrote standings of {} teams to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionStatus;
    use crate::services::config_loader::ScoreboardConfig;
    use crate::services::contest_processor::ContestSystem;

    #[test]
    fn test_snapshot_contains_board_in_rank_order() {
        let mut system = ContestSystem::new(ScoreboardConfig::default());
        system.add_team("a").unwrap();
        system.add_team("b").unwrap();
        system.start(100, 1).unwrap();
        system
            .submit('A', "b", SubmissionStatus::Accepted, 7)
            .unwrap();
        system.flush();

        let dir = std::env::temp_dir().join(format!("scoreboard-snapshot-{}", std::process::id()));
        let path = dir.join("nested").join("final.json");
        write_standings_snapshot(&path, &system.standings()).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["team"], "b");
        assert_eq!(value[0]["rank"], 1);
        assert_eq!(value[0]["penalty"], 7);
        assert_eq!(value[0]["problems"][0]["solve_time"], 7);
        assert_eq!(value[1]["team"], "a");
        assert!(value[1]["problems"][0]["solve_time"].is_null());

        assert!(write_standings_snapshot(&dir, &[]).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
