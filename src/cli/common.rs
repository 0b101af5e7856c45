//! Arguments and helpers shared by the `graph` and `check` commands.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::GlobalConfig;
use crate::core::NoodleError;
use crate::graph::CompositionGraph;
use crate::service::FsCompositionService;
use crate::walker::{DependencyWalker, WalkOptions};

/// Which layer to walk and how.
#[derive(Args, Debug, Clone, Default)]
pub struct WalkArgs {
    /// Root layer to walk
    #[arg(value_name = "USDFILE", required_unless_present = "usdfile")]
    pub file: Option<String>,

    /// Root layer to walk (alternative to the positional argument)
    #[arg(short = 'i', long, value_name = "USDFILE", conflicts_with = "file")]
    pub usdfile: Option<String>,

    /// Follow asset attributes (textures and other files)
    #[arg(short = 't', long)]
    pub textures: bool,

    /// Do not descend into layers nested deeper than this
    ///
    /// The root layer is level 0. Edges to layers past the limit are still
    /// reported, their contents are not read.
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Directory searched for bare relative asset paths (repeatable)
    ///
    /// Searched before directories from the config file and `NOODLE_SEARCH_PATH`.
    #[arg(long = "search-path", value_name = "DIR")]
    pub search_paths: Vec<PathBuf>,
}

impl WalkArgs {
    /// Root layer as given on the command line.
    #[must_use]
    pub fn root(&self) -> &str {
        self.usdfile.as_deref().or(self.file.as_deref()).unwrap_or_default()
    }

    /// Walk options: config defaults overridden by flags.
    #[must_use]
    pub fn walk_options(&self, config: &GlobalConfig) -> WalkOptions {
        let options = config.walk_options();
        let walk_attributes = options.walk_attributes || self.textures;
        let max_depth = self.max_depth.or(options.max_depth);
        options.with_attributes(walk_attributes).with_max_depth(max_depth)
    }

    /// Filesystem service with flag search paths ahead of configured ones.
    #[must_use]
    pub fn service(&self, config: &GlobalConfig) -> FsCompositionService {
        FsCompositionService::new()
            .with_search_paths(self.search_paths.clone())
            .with_search_paths(config.search_dirs())
    }

    /// Walk the root layer.
    ///
    /// # Errors
    ///
    /// - [`NoodleError::InvalidRootPath`] for an empty root argument
    /// - [`NoodleError::RootUnresolved`] when the root layer cannot be opened
    pub fn build_graph(&self, config: &GlobalConfig) -> Result<CompositionGraph> {
        let walker =
            DependencyWalker::new(self.service(config)).with_options(self.walk_options(config));
        let graph = walker.build(self.root())?;

        if !graph.root_resolved() {
            return Err(NoodleError::RootUnresolved {
                path: graph.root().to_string(),
            }
            .into());
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::SceneFixture;
    use tempfile::TempDir;

    fn args_for(root: &str) -> WalkArgs {
        WalkArgs {
            file: Some(root.to_string()),
            ..WalkArgs::default()
        }
    }

    #[test]
    fn test_flags_override_config() {
        let config = GlobalConfig {
            max_depth: Some(8),
            ..GlobalConfig::default()
        };

        let mut args = args_for("a.usda");
        let options = args.walk_options(&config);
        assert!(!options.walk_attributes);
        assert_eq!(options.max_depth, Some(8));

        args.textures = true;
        args.max_depth = Some(1);
        let options = args.walk_options(&config);
        assert!(options.walk_attributes);
        assert_eq!(options.max_depth, Some(1));
    }

    #[test]
    fn test_usdfile_wins_over_positional() {
        let args = WalkArgs {
            usdfile: Some("b.usda".to_string()),
            ..WalkArgs::default()
        };
        assert_eq!(args.root(), "b.usda");
        assert_eq!(args_for("a.usda").root(), "a.usda");
    }

    #[test]
    fn test_build_graph_shot() {
        let temp = TempDir::new().unwrap();
        let root = SceneFixture::shot().write_to(temp.path()).unwrap();

        let graph = args_for(&root.to_string_lossy()).build_graph(&GlobalConfig::default()).unwrap();
        assert_eq!(graph.node_count(), 9);
        assert_eq!(graph.offline_nodes().len(), 1);
    }

    #[test]
    fn test_build_graph_missing_root() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.usda");

        let err = args_for(&missing.to_string_lossy())
            .build_graph(&GlobalConfig::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NoodleError>(),
            Some(NoodleError::RootUnresolved { .. })
        ));
    }
}
