use tera::Tera;

pub mod gallery;
pub mod upload;

/// Compiles the page templates bundled into the binary.
pub fn templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("layout.html", include_str!("../../templates/layout.html")),
        ("gallery.html", include_str!("../../templates/gallery.html")),
        ("upload.html", include_str!("../../templates/upload.html")),
    ])?;
    Ok(tera)
}
