//! Session - everything a command needs to render listings

use crate::render;
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use listing::{ListRequest, ListingCore, ListingError, ListingPage, StaticNameSource, Viewer};
use shared::{Identity, ListingConfig, TracingLogger};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use store::InMemoryResourceStore;

/// Options shared by every command
#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    /// Listing configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Resource fixture files (glob pattern)
    #[arg(short, long, global = true, default_value = "plots/*.json")]
    pub resources: String,

    /// Identity to name directory (JSON object of uuid -> name)
    #[arg(short, long, global = true)]
    pub names: Option<PathBuf>,

    /// Simulated name service latency in milliseconds
    #[arg(long, global = true)]
    pub name_latency_ms: Option<u64>,

    /// Identity of the viewer
    #[arg(long = "as", global = true)]
    pub viewer: Option<String>,

    /// World the viewer is in
    #[arg(short, long, global = true)]
    pub world: Option<String>,

    /// Area the viewer is in
    #[arg(short, long, global = true)]
    pub area: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

impl SessionArgs {
    /// Load configuration, resources and names
    pub fn build(&self) -> anyhow::Result<Session> {
        let config = match &self.config {
            Some(path) => ListingConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ListingConfig::default(),
        };

        let store = InMemoryResourceStore::load_glob(&self.resources)
            .with_context(|| format!("Failed to load resources from '{}'", self.resources))?;

        let mut names = match &self.names {
            Some(path) => StaticNameSource::from_file(path)
                .with_context(|| format!("Failed to load names from {}", path.display()))?,
            None => StaticNameSource::new(),
        };
        if let Some(ms) = self.name_latency_ms {
            names = names.with_latency(Duration::from_millis(ms));
        }

        let identity = match &self.viewer {
            Some(raw) => Identity::parse(raw)?,
            None => Identity::from_u128(0),
        };
        let mut viewer = Viewer::new(identity);
        viewer.world = self.world.clone();
        viewer.area = self.area.clone();

        tracing::info!(resources = store.len(), names = names.len(), "Session ready");

        let core = ListingCore::new(Arc::new(TracingLogger), config, Arc::new(store), Arc::new(names))?;
        Ok(Session::new(core, viewer).with_json(self.json))
    }
}

/// A listing core plus the viewer it renders for
pub struct Session {
    pub core: ListingCore,
    pub viewer: Viewer,
    json: bool,
    show_progress: bool,
}

impl Session {
    pub fn new(core: ListingCore, viewer: Viewer) -> Self {
        Self {
            core,
            viewer,
            json: false,
            show_progress: console::user_attended_stderr(),
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Run a listing, showing a spinner while it is being fetched
    pub async fn list(&self, request: &ListRequest) -> Result<ListingPage, ListingError> {
        let spinner = (self.show_progress && !self.json).then(|| {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
                spinner.set_style(style);
            }
            spinner.set_message("Fetching plots...");
            spinner.enable_steady_tick(Duration::from_millis(80));
            spinner
        });

        let result = self.core.list(&self.viewer, request).await;

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        result
    }

    /// Text or JSON, depending on the session's output mode
    pub fn render(&self, page: &ListingPage) -> anyhow::Result<String> {
        if self.json {
            render::render_json(page)
        } else {
            Ok(render::render_page(page))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Resource, ResourceId};
    use std::io::Write;
    use store::ResourceFile;

    fn args(resources: String) -> SessionArgs {
        SessionArgs {
            config: None,
            resources,
            names: None,
            name_latency_ms: None,
            viewer: None,
            world: None,
            area: None,
            json: false,
        }
    }

    #[test]
    fn test_build_from_files() {
        let dir = tempfile::tempdir().unwrap();
        ResourceFile {
            resources: vec![Resource::new(ResourceId::new("town", 0, 0), "survival", chrono::Utc::now())],
        }
        .to_file(&dir.path().join("plots.json"))
        .unwrap();

        let mut names = tempfile::NamedTempFile::new().unwrap();
        writeln!(names, r#"{{ "00000000-0000-0000-0000-000000000001": "alice" }}"#).unwrap();

        let mut session_args = args(format!("{}/*.json", dir.path().display()));
        session_args.names = Some(names.path().to_path_buf());
        session_args.viewer = Some("00000000-0000-0000-0000-000000000001".to_string());
        session_args.world = Some("survival".to_string());
        session_args.json = true;

        let session = session_args.build().unwrap();
        assert_eq!(session.viewer.identity, Identity::from_u128(1));
        assert_eq!(session.viewer.world.as_deref(), Some("survival"));
        assert!(session.is_json());
        assert_eq!(session.core.worlds(), vec!["survival"]);
    }

    #[test]
    fn test_build_rejects_bad_viewer() {
        let dir = tempfile::tempdir().unwrap();
        let mut session_args = args(format!("{}/*.json", dir.path().display()));
        session_args.viewer = Some("not-an-identity".to_string());

        assert!(session_args.build().is_err());
    }

    #[test]
    fn test_build_reports_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut session_args = args(format!("{}/*.json", dir.path().display()));
        session_args.config = Some(dir.path().join("missing.yaml"));

        let err = session_args.build().err().unwrap();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
