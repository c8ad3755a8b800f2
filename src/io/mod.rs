//! JSON file I/O.
//!
//! | Document | Contents | Load | Save |
//! |----------|----------|------|------|
//! | [`Rig`] | Rest mesh, pins, pin targets per frame | ✓ | ✓ |
//! | [`Animation`] | Solved vertex positions per frame | ✓ | ✓ |
//!
//! ```no_run
//! use arap2d::io::{load_rig, save_rig};
//!
//! let mut rig = load_rig("rig.json").unwrap();
//! rig.frames.truncate(10);
//! save_rig(&rig, "short.json").unwrap();
//! ```

pub mod animation;
pub mod rig;

pub use animation::{Animation, AnimationFrame};
pub use rig::Rig;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;

/// Load a rig from a JSON file.
pub fn load_rig<P: AsRef<Path>>(path: P) -> Result<Rig> {
    let rig: Rig = read_json(path.as_ref())?;
    debug!(
        "Loaded rig {:?}: {} vertices, {} pins, {} frames",
        path.as_ref(),
        rig.vertices.len(),
        rig.pins.len(),
        rig.frames.len()
    );
    Ok(rig)
}

/// Save a rig as JSON.
pub fn save_rig<P: AsRef<Path>>(rig: &Rig, path: P) -> Result<()> {
    write_json(rig, path.as_ref())
}

/// Load an animation from a JSON file.
pub fn load_animation<P: AsRef<Path>>(path: P) -> Result<Animation> {
    read_json(path.as_ref())
}

/// Save an animation as JSON.
pub fn save_animation<P: AsRef<Path>>(animation: &Animation, path: P) -> Result<()> {
    write_json(animation, path.as_ref())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArapError;
    use crate::mesh::generators;
    use nalgebra::Point2;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("arap2d_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_rig_round_trip() {
        let mesh = generators::grid(2, 2, 2.0, 2.0).unwrap();
        let mut rig = Rig::from_mesh(&mesh, vec![0, 2, 8]);
        rig.push_frame(&[
            Point2::new(0.0, 0.0),
            Point2::new(2.5, 0.0),
            Point2::new(2.0, 2.25),
        ]);

        let path = temp_path("rig.json");
        save_rig(&rig, &path).unwrap();
        let loaded = load_rig(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, rig);
    }

    #[test]
    fn test_animation_round_trip() {
        let mesh = generators::grid(3, 1, 1.5, 0.5).unwrap();
        let animation = Animation::from_frames(&mesh, &[mesh.vertices()]);

        let path = temp_path("animation.json");
        save_animation(&animation, &path).unwrap();
        let loaded = load_animation(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, animation);
    }

    #[test]
    fn test_missing_file() {
        let result = load_rig(temp_path("does_not_exist.json"));
        assert!(matches!(result, Err(ArapError::Io(_))));
    }

    #[test]
    fn test_malformed_json() {
        let path = temp_path("malformed.json");
        std::fs::write(&path, "{\"vertices\": [").unwrap();
        let result = load_rig(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ArapError::Json(_))));
    }
}
