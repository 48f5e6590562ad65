//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Vellum;

/// Delete the build output
pub fn run(vellum: &Vellum) -> Result<()> {
    if vellum.public_dir.exists() {
        fs::remove_dir_all(&vellum.public_dir)?;
        tracing::info!("Deleted: {:?}", vellum.public_dir);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_public_dir() {
        let tmp = TempDir::new().unwrap();
        let vellum = Vellum::new(tmp.path()).unwrap();
        fs::create_dir_all(vellum.public_dir.join("articles")).unwrap();
        fs::write(vellum.public_dir.join("index.html"), "x").unwrap();

        run(&vellum).unwrap();
        assert!(!vellum.public_dir.exists());

        // Cleaning twice is fine
        run(&vellum).unwrap();
    }
}
