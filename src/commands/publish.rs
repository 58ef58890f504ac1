//! `hashsync publish` command.

use std::path::Path;

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::cli::PublishArgs;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::report;
use crate::sync::{RunReport, SyncRun};

/// Execute the `publish` command.
///
/// Every file is attempted; the command fails afterwards if any of them
/// failed.
///
/// # Errors
///
/// Returns an error string if configuration is invalid, the posts directory
/// cannot be listed, outputs cannot be written, or any file failed.
pub fn run(args: &PublishArgs) -> Result<(), String> {
    let config = Config::resolve(args.config_input()).map_err(|e| e.to_string())?;
    let ctx = ServiceContext::from_env(&config, args.dry_run)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    let report = runtime.block_on(execute(&config, &ctx, args.dry_run))?;
    drop(ctx);

    finish(&report, args.summary_json.as_deref())
}

/// Runs the batch under a fresh run id and logs the summary block.
///
/// # Errors
///
/// Returns an error string if the posts directory cannot be listed.
pub async fn execute(
    config: &Config,
    ctx: &ServiceContext,
    dry_run: bool,
) -> Result<RunReport, String> {
    let run_id = Uuid::new_v4();
    async {
        if config.host_inferred {
            warn!("publication-host not provided; assuming {}", config.publication_host);
        }
        info!("Publication host: {}", config.publication_host);
        info!("Posts directory: {}", config.posts_directory.display());
        if dry_run {
            info!("Dry run: mutations are logged, not sent");
        }

        let report = SyncRun::new(ctx.fs.as_ref(), ctx.remote.as_ref())
            .execute(&config.posts_directory)
            .await?;

        info!("");
        info!("{}", "=".repeat(50));
        for line in report.summary.format().lines() {
            info!("{line}");
        }
        Ok(report)
    }
    .instrument(info_span!("publish", %run_id))
    .await
}

fn finish(report: &RunReport, summary_json: Option<&Path>) -> Result<(), String> {
    report::write_github_outputs(&report.summary)?;
    if let Some(path) = summary_json {
        report::write_summary_json(path, report)?;
        info!("Run report written to {}", path.display());
    }
    if report.has_failures() {
        return Err(format!("{} post(s) failed to process", report.summary.failed));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use crate::config::ConfigInput;
    use crate::sync::RunSummary;
    use chrono::Utc;
    use serde_json::json;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("hashsync_publish_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("posts")).unwrap();
        dir
    }

    #[tokio::test]
    async fn execute_runs_every_file_against_the_context() {
        let dir = scratch("execute");
        std::fs::write(dir.join("posts/a.md"), "---\ntitle: A\nslug: a\n---\nbody").unwrap();
        std::fs::write(dir.join("posts/b.md"), "no frontmatter").unwrap();
        let cassette = Cassette {
            name: "t".into(),
            recorded_at: Utc::now(),
            publication: "blog.test".into(),
            interactions: vec![Interaction {
                seq: 0,
                port: "remote".into(),
                method: "fetch_post_by_slug".into(),
                input: json!({"slug": "a"}),
                output: json!({"Ok": {"id": "p1", "title": "A", "slug": "a"}}),
            }],
        };
        let cassette_path = dir.join("c.yaml");
        std::fs::write(&cassette_path, serde_yaml::to_string(&cassette).unwrap()).unwrap();

        let config = Config::resolve(ConfigInput {
            access_token: Some("tok".into()),
            publication_id: Some("pub".into()),
            posts_directory: Some(dir.join("posts")),
            ..ConfigInput::default()
        })
        .unwrap();
        let ctx = ServiceContext::replaying(&cassette_path, true).unwrap();

        let report = execute(&config, &ctx, true).await.unwrap();

        assert_eq!(report.summary.updated, 1);
        assert_eq!(report.summary.skipped, 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn finish_fails_when_any_file_failed() {
        let report = RunReport {
            summary: RunSummary { published: 3, failed: 2, ..RunSummary::default() },
            files: vec![],
        };
        assert_eq!(finish(&report, None).unwrap_err(), "2 post(s) failed to process");
    }

    #[test]
    fn finish_writes_summary_json() {
        let dir = scratch("finish");
        let path = dir.join("report.json");
        finish(&RunReport::default(), Some(&path)).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"summary\""));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
