//! Test fixtures for layers on disk
//!
//! This module writes sample `.usda` scenes into a directory (usually a
//! `TempDir`) for filesystem service, walker and CLI tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// One file of a fixture scene
#[derive(Clone, Debug)]
pub struct LayerFixture {
    /// Path relative to the fixture directory
    pub path: String,
    pub content: Vec<u8>,
}

impl LayerFixture {
    /// A text layer
    pub fn new(path: &str, content: &str) -> Self {
        Self {
            path: path.to_string(),
            content: content.as_bytes().to_vec(),
        }
    }

    /// A text layer with only the header
    pub fn empty(path: &str) -> Self {
        Self::new(path, "#usda 1.0\n")
    }

    /// A binary crate layer the reader must refuse
    pub fn binary(path: &str) -> Self {
        let mut content = b"PXR-USDC".to_vec();
        content.extend_from_slice(&[0, 0, 0, 0, 8, 0, 0, 0]);
        Self {
            path: path.to_string(),
            content,
        }
    }

    /// Any non-layer file (texture, clip frame, ...)
    pub fn raw(path: &str, content: &[u8]) -> Self {
        Self {
            path: path.to_string(),
            content: content.to_vec(),
        }
    }

    /// Write the file under `dir`, creating parent directories
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let file_path = dir.join(&self.path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&file_path, &self.content)
            .with_context(|| format!("Failed to write {}", file_path.display()))?;
        Ok(file_path)
    }
}

/// A multi-file scene with a root layer
#[derive(Clone, Debug)]
pub struct SceneFixture {
    /// Root layer path relative to the fixture directory
    pub root: String,
    pub files: Vec<LayerFixture>,
}

impl SceneFixture {
    /// A shot exercising every arc type.
    ///
    /// Walked without attributes it yields 9 nodes, one of them offline
    /// (`assets/blue.usda`, payloaded by the `blue` variant). With attributes
    /// the bark texture adds a tenth.
    pub fn shot() -> Self {
        Self {
            root: "shot/root.usda".to_string(),
            files: vec![
                LayerFixture::new(
                    "shot/root.usda",
                    r#"#usda 1.0
(
    "Shot root"
    defaultPrim = "World"
    subLayers = [@./layout.usda@]
)

def Xform "World" (
    prepend references = @../assets/tree.usda@</Tree>
)
{
    def "Crowd" (
        clips = {
            dictionary default = {
                asset[] assetPaths = [@../cache/crowd.1001.usd@, @../cache/crowd.1002.usd@, @../cache/crowd.1003.usd@]
                asset manifestAssetPath = @../cache/manifest.usda@
                string primPath = "/Crowd"
            }
        }
    )
    {
    }
}
"#,
                ),
                LayerFixture::new(
                    "shot/layout.usda",
                    r#"#usda 1.0

over "World"
{
    def "Set" (
        payload = @../assets/set_geo.usda@
        variants = {
            string look = "red"
        }
        prepend variantSets = "look"
    )
    {
        variantSet "look" = {
            "red" (
                prepend references = @../assets/red.usda@
            ) {
            }
            "blue" (
                prepend payload = @../assets/blue.usda@
            ) {
            }
        }
    }
}
"#,
                ),
                LayerFixture::new(
                    "assets/tree.usda",
                    r#"#usda 1.0
(
    defaultPrim = "Tree"
)

def Xform "Tree"
{
    def Shader "Bark"
    {
        uniform token info:id = "UsdUVTexture"
        asset inputs:file = @./textures/bark.png@ (
            colorSpace = "sRGB"
        )
    }
}
"#,
                ),
                LayerFixture::empty("assets/set_geo.usda"),
                LayerFixture::empty("assets/red.usda"),
                LayerFixture::raw("assets/textures/bark.png", b"\x89PNG\r\n\x1a\n"),
                LayerFixture::empty("cache/crowd.1001.usd"),
                LayerFixture::empty("cache/crowd.1002.usd"),
                LayerFixture::empty("cache/crowd.1003.usd"),
                LayerFixture::empty("cache/manifest.usda"),
            ],
        }
    }

    /// Two layers that sublayer each other
    pub fn cycle() -> Self {
        Self {
            root: "a.usda".to_string(),
            files: vec![
                LayerFixture::new("a.usda", "#usda 1.0\n(\n    subLayers = [@./b.usda@]\n)\n"),
                LayerFixture::new("b.usda", "#usda 1.0\n(\n    subLayers = [@./a.usda@]\n)\n"),
            ],
        }
    }

    /// Write every file under `dir`; returns the root layer path
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        for file in &self.files {
            file.write_to(dir)?;
        }
        Ok(dir.join(&self.root))
    }
}
