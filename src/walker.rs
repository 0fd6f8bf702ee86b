// src/walker.rs
//
// Drives the whole run: authenticated session -> module discovery -> lesson
// loop -> asset downloads. Strictly sequential; one request in flight at a
// time, ordinals and folders assigned in document order.

use crate::{
    auth::Authenticator,
    client::SessionClient,
    config::AppConfig,
    constants,
    error::*,
    extractor,
    materializer::FileMaterializer,
    media::{self, MediaDelegate, MediaRequest},
    models::{Asset, AssetKind, CrawlSession, LessonNode, MaterialOutcome, ModuleNode},
    profile::{PlatformProfile, SelectorConfig},
    selector, symbols, ui, utils,
};
use colored::*;
use log::{info, warn};
use scraper::Html;
use std::{collections::HashMap, path::Path, sync::Arc};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    Unauthenticated,
    Ready,
    WalkingModules,
    WalkingLessons,
    Done,
}

/// Per-run tallies, returned by `walk` and printed as the final report.
#[derive(Debug, Default, Clone)]
pub struct WalkStats {
    pub modules: usize,
    pub lessons: usize,
    pub lessons_failed: usize,
    pub materials_downloaded: usize,
    pub materials_skipped: usize,
    pub materials_failed: usize,
    pub videos_downloaded: usize,
    pub videos_skipped: usize,
    pub videos_failed: usize,
}

/// One pass over the parsed course root page. Pure: produces the full
/// module/lesson plan (global 1-based ordinals, document order) without
/// touching the network or the filesystem.
pub fn discover(doc: &Html, selectors: &SelectorConfig, course_url: &Url) -> Vec<ModuleNode> {
    let root = doc.root_element();
    let mut ordinal = 0u32;
    let mut modules = Vec::new();

    for module_el in selector::find_all(root, &selectors.module_item) {
        let title = selector::text_of(
            module_el,
            selectors.module_title.as_ref(),
            constants::DEFAULT_MODULE_TITLE,
        );

        // Lessons live in the module item itself unless a sub-container is
        // configured. A configured-but-absent container skips the module's
        // lessons, not the walk.
        let container = match &selectors.lesson_container {
            Some(spec) => match selector::find_first(module_el, spec) {
                Some(found) => found,
                None => {
                    warn!("lesson container not found for module '{}'; it contributes no lessons", title);
                    modules.push(ModuleNode { title, lessons: Vec::new() });
                    continue;
                }
            },
            None => module_el,
        };

        let mut lessons = Vec::new();
        for lesson_el in selector::find_all(container, &selectors.lesson_item) {
            ordinal += 1;
            let default_title = format!("Lesson {:03}", ordinal);
            let title = selector::text_of(lesson_el, selectors.lesson_title.as_ref(), &default_title);
            let page_url = selector::href_of(lesson_el, selectors.lesson_link.as_ref(), course_url);
            if page_url.is_none() {
                warn!("lesson {:03} '{}' has no resolvable page link", ordinal, title);
            }
            lessons.push(LessonNode { ordinal, title, page_url, dir: None });
        }
        modules.push(ModuleNode { title, lessons });
    }
    modules
}

/// Materializes each lesson's destination folder
/// (`base/course/module/"{ordinal:03} - {title}"`). Failures leave the
/// lesson with no destination; its downloads are bypassed later.
pub fn assign_directories(modules: &mut [ModuleNode], base: &Path, course_name: &str) {
    for module in modules.iter_mut() {
        for lesson in module.lessons.iter_mut() {
            lesson.dir = utils::create_lesson_dir(base, course_name, &module.title, &lesson.folder_name());
        }
    }
}

pub struct CourseCrawler {
    profile: Arc<PlatformProfile>,
    config: Arc<AppConfig>,
    client: SessionClient,
    media: Arc<dyn MediaDelegate>,
    session: CrawlSession,
    state: WalkState,
    course_url: Url,
    course_name: String,
    stats: WalkStats,
    failures: Vec<(String, String)>,
}

impl CourseCrawler {
    pub fn new(
        profile: Arc<PlatformProfile>,
        config: Arc<AppConfig>,
        client: SessionClient,
        media: Arc<dyn MediaDelegate>,
        course_url: Url,
        course_name: String,
    ) -> Self {
        Self {
            profile,
            config,
            client,
            media,
            session: CrawlSession::new(),
            state: WalkState::Unauthenticated,
            course_url,
            course_name,
            stats: WalkStats::default(),
            failures: Vec::new(),
        }
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    pub async fn login(&mut self, username: &str, password: &str) -> AppResult<bool> {
        let authenticator = Authenticator::new(&self.profile, &self.client);
        let authenticated = authenticator.login(&mut self.session, username, password).await?;
        if authenticated {
            self.state = WalkState::Ready;
            println!("{} Login succeeded.", *symbols::OK);
        }
        Ok(authenticated)
    }

    /// Walks the whole course. Fatal only for a failed precondition or an
    /// unreachable root page; everything below that degrades per module,
    /// per lesson or per asset and keeps going.
    pub async fn walk(&mut self) -> AppResult<WalkStats> {
        if !self.session.authenticated || self.state == WalkState::Unauthenticated {
            return Err(AppError::NotAuthenticated);
        }
        self.state = WalkState::WalkingModules;

        info!("accessing course page {}", self.course_url);
        println!("\nAccessing course page: {}", self.course_url);
        let course_url = self.course_url.clone();
        let referer = self.session.referer.clone().unwrap_or_else(|| course_url.clone());
        let response = match self.client.get_page(&mut self.session, &course_url, Some(&referer)).await {
            Ok(response) if response.is_ok() => response,
            Ok(response) => {
                return Err(AppError::CourseRootUnreachable(format!(
                    "{} returned {}",
                    course_url, response.status
                )));
            }
            Err(e) => {
                return Err(AppError::CourseRootUnreachable(format!("{}: {}", course_url, e)));
            }
        };

        let mut modules = {
            let doc = Html::parse_document(&response.body);
            discover(&doc, &self.profile.selectors, &course_url)
        };
        let lesson_count: usize = modules.iter().map(|m| m.lessons.len()).sum();
        self.stats.modules = modules.len();
        info!("found {} modules, {} lessons", modules.len(), lesson_count);
        println!("{} Found {} modules with {} lessons.", *symbols::INFO, modules.len(), lesson_count);

        assign_directories(&mut modules, &self.config.output_dir, &self.course_name);

        self.state = WalkState::WalkingLessons;
        for module in &modules {
            ui::print_sub_header(&format!("Module: {}", module.title));
            for lesson in &module.lessons {
                self.process_lesson(lesson).await;
            }
        }

        self.state = WalkState::Done;
        self.print_report();
        Ok(self.stats.clone())
    }

    async fn process_lesson(&mut self, lesson: &LessonNode) {
        self.stats.lessons += 1;
        println!("  Lesson {:03}: {}", lesson.ordinal, lesson.title);

        let Some(dir) = lesson.dir.clone() else {
            self.record_lesson_failure(lesson, "destination folder could not be created");
            return;
        };
        let Some(page_url) = lesson.page_url.clone() else {
            self.record_lesson_failure(lesson, "lesson page link not found");
            return;
        };

        // Bounds the request rate against the platform.
        tokio::time::sleep(self.config.lesson_delay).await;

        let course_url = self.course_url.clone();
        let response = match self.client.get_page(&mut self.session, &page_url, Some(&course_url)).await {
            Ok(response) if response.is_ok() => response,
            Ok(response) => {
                self.record_lesson_failure(lesson, &format!("lesson page returned {}", response.status));
                return;
            }
            Err(e) => {
                self.record_lesson_failure(lesson, &format!("lesson page fetch failed: {}", e));
                return;
            }
        };

        // Extract everything up front; downloads happen on owned data.
        let (assets, video_url) = {
            let doc = Html::parse_document(&response.body);
            (
                if self.config.skip_materials {
                    Vec::new()
                } else {
                    extractor::extract_materials(&doc, &self.profile.selectors.materials, &page_url)
                },
                if self.config.skip_videos {
                    None
                } else {
                    extractor::extract_video_url(&doc, &self.profile.selectors.video_iframes, &page_url)
                },
            )
        };

        if !self.config.skip_materials {
            if assets.is_empty() {
                println!("    {} No supporting materials found for this lesson.", *symbols::INFO);
            } else {
                let materializer = FileMaterializer::new(&self.client);
                for asset in &assets {
                    match materializer
                        .download(&mut self.session, asset, &dir, &page_url)
                        .await
                    {
                        MaterialOutcome::Downloaded(_) => self.stats.materials_downloaded += 1,
                        MaterialOutcome::Skipped(_) => self.stats.materials_skipped += 1,
                        MaterialOutcome::Failed(reason) => {
                            self.stats.materials_failed += 1;
                            self.failures.push((format!("{} ({})", asset.name, lesson.folder_name()), reason));
                        }
                    }
                }
            }
        }

        if !self.config.skip_videos {
            match video_url {
                Some(url) => {
                    let asset = Asset {
                        kind: AssetKind::Video,
                        url,
                        name: lesson.title.clone(),
                    };
                    if let Some(existing) = media::existing_video_file(&dir, &asset.name) {
                        info!("video already present at {:?}, skipping", existing);
                        println!("        {} Video already exists. Skipping.", *symbols::INFO);
                        self.stats.videos_skipped += 1;
                    } else {
                        println!("        Video/player URL found: {}", asset.url);
                        let request = MediaRequest::from_asset(&asset, &page_url, &dir);
                        let delegate = self.media.clone();
                        match delegate.fetch(&request).await {
                            Ok(()) => {
                                println!("        {} Video '{}' downloaded.", *symbols::OK, lesson.title);
                                self.stats.videos_downloaded += 1;
                            }
                            Err(e) => {
                                warn!("media delegate failed for '{}': {}", lesson.title, e);
                                println!("        {} Video download failed: {}", *symbols::ERROR, e);
                                self.stats.videos_failed += 1;
                                self.failures.push((lesson.folder_name(), e.to_string()));
                            }
                        }
                    }
                }
                None => {
                    println!("        {} No video/player URL found on this lesson page.", *symbols::WARN);
                }
            }
        }
    }

    fn record_lesson_failure(&mut self, lesson: &LessonNode, reason: &str) {
        warn!("lesson {:03} '{}' skipped: {}", lesson.ordinal, lesson.title, reason);
        println!("    {} Skipping lesson: {}", *symbols::WARN, reason);
        self.stats.lessons_failed += 1;
        self.failures.push((lesson.folder_name(), reason.to_string()));
    }

    fn print_report(&self) {
        let stats = &self.stats;
        info!(
            "walk report: modules={}, lessons={} (failed {}), materials ok/skip/fail={}/{}/{}, videos ok/skip/fail={}/{}/{}",
            stats.modules,
            stats.lessons,
            stats.lessons_failed,
            stats.materials_downloaded,
            stats.materials_skipped,
            stats.materials_failed,
            stats.videos_downloaded,
            stats.videos_skipped,
            stats.videos_failed
        );

        ui::print_header(&format!("Course '{}' finished", self.course_name));
        println!(
            "Lessons: {} ({} failed) | Materials: {} | Videos: {}",
            stats.lessons,
            stats.lessons_failed,
            format!(
                "{} downloaded, {} skipped, {} failed",
                stats.materials_downloaded, stats.materials_skipped, stats.materials_failed
            ),
            format!(
                "{} downloaded, {} skipped, {} failed",
                stats.videos_downloaded, stats.videos_skipped, stats.videos_failed
            ),
        );

        if !self.failures.is_empty() {
            ui::print_sub_header("Failures");
            let mut grouped: HashMap<&String, Vec<&String>> = HashMap::new();
            for (item, reason) in &self.failures {
                grouped.entry(reason).or_default().push(item);
            }
            let mut reasons: Vec<_> = grouped.keys().collect();
            reasons.sort();
            for reason in reasons {
                println!("  - {}", format!("reason: {}", reason).red());
                let mut items = grouped[*reason].clone();
                items.sort();
                for item in items {
                    println!("    - {}", item);
                }
            }
        }
    }
}
