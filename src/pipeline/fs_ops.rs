use std::fs;
use std::path::{Path, PathBuf};

use crate::model::Category;

pub fn ensure_dir<P: AsRef<Path>>(p: P) -> std::io::Result<()> {
    if !p.as_ref().exists() {
        fs::create_dir_all(&p)?;
    }
    Ok(())
}

pub fn output_path_for(output_dir: &Path, category: Category) -> PathBuf {
    output_dir.join(format!("{}.jpg", category.id()))
}

/// Categories that already have an exported file in `output_dir`.
pub fn existing_exports(output_dir: &Path) -> Vec<Category> {
    Category::all()
        .into_iter()
        .filter(|c| output_path_for(output_dir, *c).is_file())
        .collect()
}
