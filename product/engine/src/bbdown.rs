use crate::config::Preferences;
use crate::paths::AppPaths;
use crate::stream_list::{self, StreamRecord};
use crate::{cmd, EngineError, Result};
use serde::{Deserialize, Serialize};

const BBDOWN_TOOL: &str = "BBDown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamListing {
    pub source_url: String,
    pub streams: Vec<StreamRecord>,
}

/// Validates a pasted video URL or bare BBDown id (`BV…`, `av…`, `ep…`, `ss…`).
///
/// Input with a scheme must be http/https with a host. The text is returned as
/// typed; with `strip_query` everything from the first `?` is dropped.
pub fn normalize_video_url(input: &str, strip_query: bool) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidUrl("empty URL provided".to_string()));
    }

    if trimmed.contains("://") {
        let url = url::Url::parse(trimmed)
            .map_err(|e| EngineError::InvalidUrl(format!("{trimmed}: {e}")))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(EngineError::InvalidUrl(format!(
                "unsupported scheme {} (only http/https are allowed)",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(EngineError::InvalidUrl(format!("{trimmed}: missing host")));
        }
    }

    let normalized = if strip_query {
        trimmed.split('?').next().unwrap_or(trimmed)
    } else {
        trimmed
    };
    Ok(normalized.to_string())
}

pub fn info_args(url: &str) -> Vec<String> {
    vec!["-info".to_string(), url.to_string()]
}

/// Parses captured `-info` stdout. BBDown prints in the system code page on
/// some hosts, so undecodable bytes are replaced rather than rejected.
pub fn listing_from_stdout(source_url: &str, stdout: &[u8]) -> StreamListing {
    let text = String::from_utf8_lossy(stdout);
    StreamListing {
        source_url: source_url.to_string(),
        streams: stream_list::parse_stream_list(&text),
    }
}

/// Runs `BBDown -info <url>` once and parses the reported streams.
pub fn fetch_stream_list(
    paths: &AppPaths,
    prefs: &Preferences,
    url: &str,
) -> Result<StreamListing> {
    let source_url = normalize_video_url(url, prefs.strip_url_query)?;
    let program = prefs.bbdown_cmd(paths);
    tracing::debug!(
        program = %program.display(),
        bundled = paths.is_bundled_bbdown(&program),
        url = %source_url,
        "running BBDown -info"
    );

    let mut command = cmd::command(&program);
    command.args(info_args(&source_url));
    let output = cmd::capture(&mut command, BBDOWN_TOOL).inspect_err(|e| {
        tracing::warn!(error = %e, "BBDown -info did not complete");
    })?;

    let listing = listing_from_stdout(&source_url, &output.stdout);
    tracing::info!(
        url = %listing.source_url,
        streams = listing.streams.len(),
        "parsed BBDown stream listing"
    );
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_cuts_at_first_question_mark() {
        assert_eq!(
            normalize_video_url(
                " https://www.bilibili.com/video/BV1VUzTB3Ecb?spm_id_from=333.1007#reply ",
                true
            )
            .expect("normalize"),
            "https://www.bilibili.com/video/BV1VUzTB3Ecb"
        );
        assert_eq!(
            normalize_video_url("https://www.bilibili.com/video/BV1VUzTB3Ecb?p=2", false)
                .expect("normalize"),
            "https://www.bilibili.com/video/BV1VUzTB3Ecb?p=2"
        );
    }

    #[test]
    fn normalize_returns_url_text_as_typed() {
        assert_eq!(
            normalize_video_url("https://b23.tv", true).expect("normalize"),
            "https://b23.tv"
        );
        assert_eq!(
            normalize_video_url("https://x.test/v#reply", true).expect("normalize"),
            "https://x.test/v#reply"
        );
    }

    #[test]
    fn normalize_passes_bare_ids_through() {
        for id in ["BV1VUzTB3Ecb", "av170001", "ep691614", "ss39462"] {
            assert_eq!(normalize_video_url(id, true).expect("normalize"), id);
        }
        assert_eq!(
            normalize_video_url(" BV1VUzTB3Ecb?p=3 ", true).expect("normalize"),
            "BV1VUzTB3Ecb"
        );
        assert_eq!(
            normalize_video_url("BV1VUzTB3Ecb?p=3", false).expect("normalize"),
            "BV1VUzTB3Ecb?p=3"
        );
    }

    #[test]
    fn normalize_allows_http_https_only() {
        assert!(normalize_video_url("http://b23.tv/abc", true).is_ok());
        assert!(normalize_video_url("ftp://example.com/video", true).is_err());
        assert!(normalize_video_url("file:///tmp/video.mp4", true).is_err());
        assert!(normalize_video_url("   ", true).is_err());
    }

    #[test]
    fn info_args_request_listing_only() {
        assert_eq!(
            info_args("https://www.bilibili.com/video/BV1"),
            vec!["-info", "https://www.bilibili.com/video/BV1"]
        );
    }

    #[test]
    fn listing_replaces_invalid_bytes() {
        let mut stdout = b"1. [DASH] \xff\xfe 1080P\nhttps://example.com/a.m4s\n".to_vec();
        stdout.extend_from_slice(b"trailer\n");

        let listing = listing_from_stdout("https://www.bilibili.com/video/BV1", &stdout);
        assert_eq!(listing.streams.len(), 1);
        assert_eq!(listing.streams[0].tags, vec!["DASH".to_string()]);
        assert!(listing.streams[0].raw.contains('\u{FFFD}'));
    }

    #[test]
    fn fetch_reports_missing_bbdown() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::new(dir.path().to_path_buf());
        let prefs = Preferences {
            bbdown_path: Some(dir.path().join("missing-bbdown").to_string_lossy().to_string()),
            strip_url_query: true,
        };

        match fetch_stream_list(&paths, &prefs, "https://www.bilibili.com/video/BV1") {
            Err(EngineError::ExternalToolMissing { tool }) => assert_eq!(tool, "BBDown"),
            other => panic!("expected ExternalToolMissing, got {other:?}"),
        }
    }

    #[test]
    fn fetch_rejects_bad_url_before_running_tool() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::new(dir.path().to_path_buf());

        assert!(matches!(
            fetch_stream_list(&paths, &Preferences::default(), "ftp://example.com/video"),
            Err(EngineError::InvalidUrl(_))
        ));
    }
}
