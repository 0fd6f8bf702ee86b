// src/materializer.rs
//
// Streams a resolved asset URL to disk. Already-present, non-empty files
// are treated as satisfied, which is what makes whole-run re-invocation the
// resume mechanism.

use crate::{
    client::SessionClient,
    constants,
    error::*,
    models::{Asset, CrawlSession, MaterialOutcome},
    symbols, utils,
};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::{io::Write as IoWrite, path::Path};
use tempfile::NamedTempFile;
use url::Url;

pub struct FileMaterializer<'a> {
    client: &'a SessionClient,
}

impl<'a> FileMaterializer<'a> {
    pub fn new(client: &'a SessionClient) -> Self {
        Self { client }
    }

    /// Downloads one asset into `dest_dir`. Per-asset failures are returned
    /// as data; the caller tallies them and the walk continues.
    pub async fn download(
        &self,
        session: &mut CrawlSession,
        asset: &Asset,
        dest_dir: &Path,
        referer: &Url,
    ) -> MaterialOutcome {
        let kind_label = asset.kind.label();
        match self.try_download(session, asset, dest_dir, referer).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("{} '{}' failed: {}", kind_label, asset.name, e);
                println!("        {} {} '{}' failed: {}", *symbols::ERROR, kind_label, asset.name, e);
                MaterialOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_download(
        &self,
        session: &mut CrawlSession,
        asset: &Asset,
        dest_dir: &Path,
        referer: &Url,
    ) -> AppResult<MaterialOutcome> {
        let kind_label = asset.kind.label();
        // Extension preference: URL path, then the suggested display name,
        // then the generic fallback. The stem never keeps a duplicate tail.
        let (stem, name_ext) = utils::split_suggested_ext(&asset.name);
        let ext = utils::extension_from_url(&asset.url)
            .or(name_ext)
            .unwrap_or_else(|| constants::FALLBACK_EXTENSION.to_string());
        let filename = format!("{}{}", utils::sanitize_filename(stem), ext);
        let path = dest_dir.join(&filename);

        if path.exists() && path.metadata()?.len() > 0 {
            info!("{} '{}' already present, skipping", kind_label, filename);
            println!("        {} {} '{}' already exists. Skipping.", *symbols::INFO, kind_label, filename);
            return Ok(MaterialOutcome::Skipped(path));
        }

        info!("downloading {} '{}' from {}", kind_label, filename, asset.url);
        println!("        Downloading {}: {}", kind_label, filename);
        let response = self
            .client
            .get_stream(session, &asset.url, Some(referer))
            .await?
            .error_for_status()?;

        let pbar = match response.content_length() {
            Some(len) => {
                let bar = ProgressBar::new(len);
                bar.set_style(
                    ProgressStyle::with_template("        {bytes:>10}/{total_bytes} {bar:32} {bytes_per_sec}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                bar
            }
            None => ProgressBar::new_spinner(),
        };

        // Stream through a temp file in the destination directory so a
        // failed transfer never leaves a truncated file that a later run
        // would treat as satisfied.
        let mut tmp = NamedTempFile::new_in(dest_dir)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            tmp.write_all(&chunk)?;
            pbar.inc(chunk.len() as u64);
        }
        pbar.finish_and_clear();
        tmp.persist(&path)?;

        info!("{} '{}' downloaded", kind_label, filename);
        println!("        {} {} '{}' downloaded.", *symbols::OK, kind_label, filename);
        Ok(MaterialOutcome::Downloaded(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetKind;

    // Exercises only the pure naming logic; transfer behavior is covered by
    // the integration tests with a mock server.
    fn asset(url: &str, name: &str) -> Asset {
        Asset {
            kind: AssetKind::Material,
            url: Url::parse(url).unwrap(),
            name: name.to_string(),
        }
    }

    fn target_filename(asset: &Asset) -> String {
        let (stem, name_ext) = utils::split_suggested_ext(&asset.name);
        let ext = utils::extension_from_url(&asset.url)
            .or(name_ext)
            .unwrap_or_else(|| constants::FALLBACK_EXTENSION.to_string());
        format!("{}{}", utils::sanitize_filename(stem), ext)
    }

    #[test]
    fn url_extension_wins_over_name_extension() {
        let a = asset("https://cdn.example.com/f/handout.pdf?sig=1", "Handout Week 1.docx");
        assert_eq!(target_filename(&a), "Handout Week 1.pdf");
    }

    #[test]
    fn name_extension_used_when_url_has_none() {
        let a = asset("https://cdn.example.com/download?id=9", "Slides Aula 1.pdf");
        assert_eq!(target_filename(&a), "Slides Aula 1.pdf");
    }

    #[test]
    fn generic_fallback_when_neither_is_usable() {
        let a = asset("https://cdn.example.com/download?id=9", "apostila completa");
        assert_eq!(target_filename(&a), format!("apostila completa{}", constants::FALLBACK_EXTENSION));
    }
}
