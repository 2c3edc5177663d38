//! Mojang launcher-metadata backed implementation of [`GameLibrary`].
//!
//! Version profiles live at `versions/<id>/<id>.json`. Mod loader profiles
//! name their vanilla parent in `inheritsFrom` and are merged with it before
//! anything is downloaded or launched.

use crate::error::{LauncherError, Result};
use crate::library::{maven_path, GameLibrary, LaunchOptions};
use crate::status::StatusSender;
use futures_util::stream::{self, StreamExt};
use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

pub const VERSION_MANIFEST_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest_v2.json";
pub const LIBRARIES_URL: &str = "https://libraries.minecraft.net/";
pub const RESOURCES_URL: &str = "https://resources.download.minecraft.net";

const LEGACY_FORGE_MAVEN: &str = "http://files.minecraftforge.net/maven/";
const FORGE_MAVEN: &str = "https://maven.minecraftforge.net/";
const LAUNCHER_NAME: &str = "grcraft";
const PARALLEL_DOWNLOADS: usize = 8;
const MAX_INHERITANCE_DEPTH: usize = 8;
const PROGRESS_EVERY: usize = 100;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+)\}").expect("placeholder pattern is valid"));

#[derive(Debug, Deserialize)]
struct VersionManifest {
    versions: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: String,
    url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    pub id: String,
    #[serde(default)]
    pub inherits_from: Option<String>,
    #[serde(default)]
    pub main_class: Option<String>,
    #[serde(default)]
    pub minecraft_arguments: Option<String>,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    #[serde(default)]
    pub libraries: Vec<Library>,
    #[serde(default)]
    pub asset_index: Option<AssetIndexRef>,
    #[serde(default)]
    pub assets: Option<String>,
    #[serde(default)]
    pub downloads: Option<VersionDownloads>,
    #[serde(default)]
    pub jar: Option<String>,
    #[serde(default, rename = "type")]
    pub version_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<Argument>,
    #[serde(default)]
    pub jvm: Vec<Argument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    Plain(String),
    Conditional { rules: Vec<Rule>, value: ArgumentValue },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
    #[serde(default)]
    pub features: Option<HashMap<String, bool>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Library {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub natives: Option<HashMap<String, String>>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub extract: Option<Extract>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<Artifact>,
    #[serde(default)]
    pub classifiers: HashMap<String, Artifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Extract {
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetIndexRef {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionDownloads {
    #[serde(default)]
    pub client: Option<Download>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Download {
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct AssetIndex {
    objects: HashMap<String, AssetObject>,
}

#[derive(Debug, Deserialize)]
struct AssetObject {
    hash: String,
    size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DownloadJob {
    url: String,
    path: PathBuf,
    size: Option<u64>,
    /// Maven-derived URLs are guesses; their failure only warns.
    required: bool,
}

impl DownloadJob {
    fn is_satisfied(&self) -> bool {
        match std::fs::metadata(&self.path) {
            Ok(meta) => self.size.is_none_or(|size| meta.len() == size),
            Err(_) => false,
        }
    }

    /// Sibling temp file, unique per target since the whole file name is kept.
    fn partial_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".part");
        self.path.with_file_name(name)
    }
}

/// Collapses jobs that write the same file, keeping the first position.
/// A required entry beats an optional one, then a sized entry beats an unsized one.
fn dedupe_jobs(jobs: Vec<DownloadJob>) -> Vec<DownloadJob> {
    let mut slots: HashMap<PathBuf, usize> = HashMap::new();
    let mut unique: Vec<DownloadJob> = Vec::with_capacity(jobs.len());
    for job in jobs {
        match slots.get(&job.path) {
            Some(&slot) => {
                let kept = &unique[slot];
                let better = (job.required && !kept.required)
                    || (job.required == kept.required && kept.size.is_none() && job.size.is_some());
                if better {
                    unique[slot] = job;
                }
            }
            None => {
                slots.insert(job.path.clone(), unique.len());
                unique.push(job);
            }
        }
    }
    unique
}

/// One jar contributed by a library, relative to `libraries/`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LibraryFile {
    relative: PathBuf,
    url: Option<String>,
    size: Option<u64>,
    required: bool,
}

pub fn current_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "osx",
        other => other,
    }
}

fn current_arch_bits() -> &'static str {
    if cfg!(target_pointer_width = "64") { "64" } else { "32" }
}

/// Mojang rule semantics: no rules allows, otherwise the last matching rule decides.
pub fn rules_allow(rules: &[Rule], os: &str) -> bool {
    if rules.is_empty() {
        return true;
    }

    let mut allowed = false;
    for rule in rules {
        if rule_matches(rule, os) {
            allowed = rule.action == RuleAction::Allow;
        }
    }
    allowed
}

fn rule_matches(rule: &Rule, os: &str) -> bool {
    // Feature-gated rules (demo mode, custom resolution, ...) are never enabled.
    if rule.features.is_some() {
        return false;
    }
    match &rule.os {
        None => true,
        Some(os_rule) => {
            let name_ok = os_rule.name.as_deref().is_none_or(|name| name == os);
            let arch_ok = os_rule
                .arch
                .as_deref()
                .is_none_or(|arch| arch != "x86" || current_arch_bits() == "32");
            name_ok && arch_ok
        }
    }
}

/// Child libraries first, child main class and arguments win.
pub fn merge_inherited(child: VersionJson, parent: VersionJson) -> VersionJson {
    let mut libraries = child.libraries;
    libraries.extend(parent.libraries);

    let arguments = match (parent.arguments, child.arguments) {
        (Some(mut inherited), Some(own)) => {
            inherited.game.extend(own.game);
            inherited.jvm.extend(own.jvm);
            Some(inherited)
        }
        (inherited, own) => own.or(inherited),
    };

    VersionJson {
        id: child.id,
        inherits_from: None,
        main_class: child.main_class.or(parent.main_class),
        minecraft_arguments: child.minecraft_arguments.or(parent.minecraft_arguments),
        arguments,
        libraries,
        asset_index: child.asset_index.or(parent.asset_index),
        assets: child.assets.or(parent.assets),
        downloads: child.downloads.or(parent.downloads),
        jar: child.jar.or(parent.jar).or(Some(parent.id)),
        version_type: child.version_type.or(parent.version_type),
    }
}

/// Folds a child-first profile chain into one profile.
fn merge_chain(chain: Vec<VersionJson>) -> Option<VersionJson> {
    let mut profiles = chain.into_iter().rev();
    let root = profiles.next()?;
    Some(profiles.fold(root, |parent, child| merge_inherited(child, parent)))
}

fn url_path(relative: &Path) -> String {
    relative
        .iter()
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn repository_url(library: &Library) -> String {
    let base = library.url.as_deref().unwrap_or(LIBRARIES_URL);
    let base = if base == LEGACY_FORGE_MAVEN { FORGE_MAVEN } else { base };
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}

fn natives_classifier(library: &Library, os: &str) -> Option<String> {
    library
        .natives
        .as_ref()?
        .get(os)
        .map(|classifier| classifier.replace("${arch}", current_arch_bits()))
}

pub fn version_json_path(directory: &Path, version: &str) -> PathBuf {
    directory
        .join("versions")
        .join(version)
        .join(format!("{version}.json"))
}

pub struct MinecraftLibrary {
    manifest_url: String,
    resources_url: String,
    os: &'static str,
}

impl Default for MinecraftLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MinecraftLibrary {
    pub fn new() -> Self {
        Self {
            manifest_url: VERSION_MANIFEST_URL.to_string(),
            resources_url: RESOURCES_URL.to_string(),
            os: current_os(),
        }
    }

    pub fn with_manifest_url(mut self, url: impl Into<String>) -> Self {
        self.manifest_url = url.into();
        self
    }

    pub fn with_resources_url(mut self, url: impl Into<String>) -> Self {
        self.resources_url = url.into();
        self
    }

    fn libraries_dir(directory: &Path) -> PathBuf {
        directory.join("libraries")
    }

    fn natives_dir(directory: &Path, version: &str) -> PathBuf {
        directory.join("versions").join(version).join("natives")
    }

    fn client_jar_path(directory: &Path, profile: &VersionJson) -> PathBuf {
        let jar = profile.jar.as_deref().unwrap_or(&profile.id);
        directory
            .join("versions")
            .join(jar)
            .join(format!("{jar}.jar"))
    }

    fn read_local(directory: &Path, version: &str) -> Result<VersionJson> {
        let path = version_json_path(directory, version);
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            LauncherError::VersionMetadata(format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Reads the installed profile and every profile it inherits from.
    pub fn resolve(&self, directory: &Path, version: &str) -> Result<VersionJson> {
        let mut chain = Vec::new();
        let mut next = Some(version.to_string());
        while let Some(id) = next {
            if chain.len() == MAX_INHERITANCE_DEPTH {
                return Err(LauncherError::VersionMetadata(format!(
                    "inheritance chain of {version} is too deep"
                )));
            }
            let profile = Self::read_local(directory, &id)?;
            next = profile.inherits_from.clone();
            chain.push(profile);
        }
        merge_chain(chain)
            .ok_or_else(|| LauncherError::VersionMetadata(format!("no profile for {version}")))
    }

    /// Relative library path and download URL of an allowed library's main jar.
    fn library_artifact(&self, library: &Library) -> Option<LibraryFile> {
        if let Some(artifact) = library.downloads.as_ref().and_then(|d| d.artifact.as_ref()) {
            let relative = artifact
                .path
                .as_ref()
                .map(PathBuf::from)
                .or_else(|| maven_path(&library.name))?;
            return Some(LibraryFile {
                relative,
                url: (!artifact.url.is_empty()).then(|| artifact.url.clone()),
                size: artifact.size,
                required: true,
            });
        }

        // Legacy native-only entries carry no main jar.
        if library.natives.is_some() {
            return None;
        }

        let relative = maven_path(&library.name)?;
        let url = format!("{}{}", repository_url(library), url_path(&relative));
        Some(LibraryFile {
            relative,
            url: Some(url),
            size: None,
            required: false,
        })
    }

    fn library_native(&self, library: &Library) -> Option<LibraryFile> {
        let classifier = natives_classifier(library, self.os)?;

        if let Some(artifact) = library
            .downloads
            .as_ref()
            .and_then(|d| d.classifiers.get(&classifier))
        {
            let relative = artifact
                .path
                .as_ref()
                .map(PathBuf::from)
                .or_else(|| maven_path(&format!("{}:{classifier}", library.name)))?;
            return Some(LibraryFile {
                relative,
                url: (!artifact.url.is_empty()).then(|| artifact.url.clone()),
                size: artifact.size,
                required: true,
            });
        }

        let relative = maven_path(&format!("{}:{classifier}", library.name))?;
        let url = format!("{}{}", repository_url(library), url_path(&relative));
        Some(LibraryFile {
            relative,
            url: Some(url),
            size: None,
            required: true,
        })
    }

    fn classpath(&self, directory: &Path, profile: &VersionJson) -> Vec<PathBuf> {
        let libraries_dir = Self::libraries_dir(directory);
        let mut entries: Vec<PathBuf> = Vec::new();
        let allowed = profile.libraries.iter().filter(|lib| rules_allow(&lib.rules, self.os));
        for file in allowed.filter_map(|lib| self.library_artifact(lib)) {
            let path = libraries_dir.join(file.relative);
            if !entries.contains(&path) {
                entries.push(path);
            }
        }
        entries.push(Self::client_jar_path(directory, profile));
        entries
    }

    fn evaluate_arguments(&self, arguments: &[Argument]) -> Vec<String> {
        let mut out = Vec::new();
        for argument in arguments {
            match argument {
                Argument::Plain(value) => out.push(value.clone()),
                Argument::Conditional { rules, value } if rules_allow(rules, self.os) => match value {
                    ArgumentValue::One(value) => out.push(value.clone()),
                    ArgumentValue::Many(values) => out.extend(values.iter().cloned()),
                },
                Argument::Conditional { .. } => {}
            }
        }
        out
    }

    /// Assembles `[java, jvm args.., main class, game args..]` for an installed version.
    pub fn command_for(
        &self,
        profile: &VersionJson,
        directory: &Path,
        options: &LaunchOptions,
    ) -> Result<Vec<String>> {
        let main_class = profile.main_class.clone().ok_or_else(|| {
            LauncherError::VersionMetadata(format!("{} has no main class", profile.id))
        })?;

        let separator = if cfg!(windows) { ";" } else { ":" };
        let classpath = self
            .classpath(directory, profile)
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(separator);

        let assets_root = directory.join("assets");
        let assets_index = profile
            .asset_index
            .as_ref()
            .map(|index| index.id.clone())
            .or_else(|| profile.assets.clone())
            .unwrap_or_else(|| "legacy".to_string());

        let values: HashMap<&str, String> = HashMap::from([
            ("auth_player_name", options.username.clone()),
            ("version_name", options.version.clone()),
            ("game_directory", options.game_directory.display().to_string()),
            ("assets_root", assets_root.display().to_string()),
            ("game_assets", assets_root.join("virtual").join("legacy").display().to_string()),
            ("assets_index_name", assets_index),
            ("auth_uuid", options.uuid.clone()),
            ("auth_access_token", options.token.clone()),
            ("auth_session", options.token.clone()),
            ("auth_xuid", String::new()),
            ("clientid", String::new()),
            ("user_type", "legacy".to_string()),
            ("version_type", profile.version_type.clone().unwrap_or_else(|| "release".to_string())),
            ("user_properties", "{}".to_string()),
            ("natives_directory", Self::natives_dir(directory, &profile.id).display().to_string()),
            ("launcher_name", LAUNCHER_NAME.to_string()),
            ("launcher_version", env!("CARGO_PKG_VERSION").to_string()),
            ("classpath", classpath),
            ("classpath_separator", separator.to_string()),
            ("library_directory", Self::libraries_dir(directory).display().to_string()),
        ]);

        let jvm = match profile.arguments.as_ref().filter(|a| !a.jvm.is_empty()) {
            Some(arguments) => self.evaluate_arguments(&arguments.jvm),
            None => vec![
                "-Djava.library.path=${natives_directory}".to_string(),
                "-cp".to_string(),
                "${classpath}".to_string(),
            ],
        };

        let game = match (&profile.minecraft_arguments, &profile.arguments) {
            (Some(legacy), _) => legacy.split_whitespace().map(str::to_string).collect(),
            (None, Some(arguments)) => self.evaluate_arguments(&arguments.game),
            (None, None) => Vec::new(),
        };

        let java = options
            .executable_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "java".to_string());

        let mut command = vec![java];
        command.extend(options.jvm_arguments.iter().cloned());
        command.extend(jvm.iter().map(|arg| substitute(arg, &values)));
        command.push(main_class);
        command.extend(game.iter().map(|arg| substitute(arg, &values)));
        Ok(command)
    }

    async fn fetch_manifest(&self, client: &reqwest::Client) -> Result<VersionManifest> {
        let manifest = client
            .get(&self.manifest_url)
            .send()
            .await?
            .error_for_status()?
            .json::<VersionManifest>()
            .await?;
        Ok(manifest)
    }

    async fn fetch_profile(
        &self,
        client: &reqwest::Client,
        directory: &Path,
        version: &str,
        manifest: &mut Option<VersionManifest>,
        status: &StatusSender,
    ) -> Result<VersionJson> {
        let path = version_json_path(directory, version);
        if path.is_file() {
            let contents = tokio::fs::read_to_string(&path).await?;
            return Ok(serde_json::from_str(&contents)?);
        }

        status.emit(format!("Downloading version metadata for {version}..."));
        if manifest.is_none() {
            *manifest = Some(self.fetch_manifest(client).await?);
        }
        let entry = manifest
            .as_ref()
            .and_then(|m| m.versions.iter().find(|v| v.id == version))
            .ok_or_else(|| {
                LauncherError::Install(format!(
                    "version {version} is not installed and is not in the version manifest"
                ))
            })?;

        let contents = client
            .get(&entry.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let profile: VersionJson = serde_json::from_str(&contents)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, contents).await?;
        Ok(profile)
    }

    fn download_jobs(&self, directory: &Path, profile: &VersionJson) -> Vec<DownloadJob> {
        let libraries_dir = Self::libraries_dir(directory);
        let mut jobs = Vec::new();

        if let Some(client) = profile.downloads.as_ref().and_then(|d| d.client.as_ref()) {
            jobs.push(DownloadJob {
                url: client.url.clone(),
                path: Self::client_jar_path(directory, profile),
                size: client.size,
                required: true,
            });
        }

        for library in profile.libraries.iter().filter(|lib| rules_allow(&lib.rules, self.os)) {
            let files = [self.library_artifact(library), self.library_native(library)];
            for file in files.into_iter().flatten() {
                if let Some(url) = file.url {
                    jobs.push(DownloadJob {
                        url,
                        path: libraries_dir.join(file.relative),
                        size: file.size,
                        required: file.required,
                    });
                }
            }
        }

        jobs
    }

    async fn asset_jobs(
        &self,
        client: &reqwest::Client,
        directory: &Path,
        profile: &VersionJson,
    ) -> Result<Vec<DownloadJob>> {
        let Some(index_ref) = &profile.asset_index else {
            return Ok(Vec::new());
        };

        let assets_dir = directory.join("assets");
        let index_job = DownloadJob {
            url: index_ref.url.clone(),
            path: assets_dir.join("indexes").join(format!("{}.json", index_ref.id)),
            size: index_ref.size,
            required: true,
        };
        if !index_job.is_satisfied() {
            download(client, &index_job).await?;
        }

        let contents = tokio::fs::read_to_string(&index_job.path).await?;
        let index: AssetIndex = serde_json::from_str(&contents)?;

        Ok(index
            .objects
            .into_values()
            .map(|object| {
                let prefix = object.hash.get(..2).unwrap_or_default().to_string();
                DownloadJob {
                    url: format!("{}/{prefix}/{}", self.resources_url, object.hash),
                    path: assets_dir.join("objects").join(&prefix).join(&object.hash),
                    size: Some(object.size),
                    required: true,
                }
            })
            .collect())
    }

    async fn download_all(
        &self,
        client: &reqwest::Client,
        jobs: Vec<DownloadJob>,
        status: &StatusSender,
    ) -> Result<()> {
        let jobs = dedupe_jobs(jobs);
        let total_jobs = jobs.len();
        let pending: Vec<DownloadJob> = jobs.into_iter().filter(|job| !job.is_satisfied()).collect();
        if pending.is_empty() {
            status.emit(format!("All {total_jobs} game files are already present."));
            return Ok(());
        }

        let total = pending.len();
        status.emit(format!(
            "Downloading {total} files ({} already present)...",
            total_jobs - total
        ));

        let mut results = stream::iter(pending)
            .map(|job| async move {
                let outcome = download(client, &job).await;
                (job, outcome)
            })
            .buffer_unordered(PARALLEL_DOWNLOADS);

        let mut done = 0;
        while let Some((job, outcome)) = results.next().await {
            match outcome {
                Ok(()) => {}
                Err(e) if !job.required => {
                    warn!("Optional download {} failed: {}", job.url, e);
                    status.emit(format!("Warning: could not download {}", job.url));
                }
                Err(e) => {
                    return Err(LauncherError::Install(format!("{}: {e}", job.url)));
                }
            }
            done += 1;
            if done % PROGRESS_EVERY == 0 && done < total {
                status.emit(format!("Downloading files: {done}/{total}"));
            }
        }
        Ok(())
    }

    fn extract_natives(&self, directory: &Path, profile: &VersionJson) -> Result<usize> {
        let natives_dir = Self::natives_dir(directory, &profile.id);
        std::fs::create_dir_all(&natives_dir)?;
        let libraries_dir = Self::libraries_dir(directory);

        let mut extracted = 0;
        for library in profile.libraries.iter().filter(|lib| rules_allow(&lib.rules, self.os)) {
            let Some(native) = self.library_native(library) else {
                continue;
            };
            let excludes = library
                .extract
                .as_ref()
                .map(|e| e.exclude.as_slice())
                .unwrap_or_default();
            extracted += extract_archive(&libraries_dir.join(native.relative), &natives_dir, excludes)?;
        }
        Ok(extracted)
    }

    async fn install(&self, version: &str, directory: &Path, status: &StatusSender) -> Result<()> {
        // Pooled connections belong to the runtime, so each install gets its own client.
        let client = reqwest::Client::builder()
            .user_agent(concat!("grcraft/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let mut manifest = None;
        let mut chain = Vec::new();
        let mut next = Some(version.to_string());
        while let Some(id) = next {
            if chain.len() == MAX_INHERITANCE_DEPTH {
                return Err(LauncherError::VersionMetadata(format!(
                    "inheritance chain of {version} is too deep"
                )));
            }
            status.emit(format!("Checking version files for {id}..."));
            let profile = self
                .fetch_profile(&client, directory, &id, &mut manifest, status)
                .await?;
            next = profile.inherits_from.clone();
            chain.push(profile);
        }
        let profile = merge_chain(chain)
            .ok_or_else(|| LauncherError::VersionMetadata(format!("no profile for {version}")))?;

        let mut jobs = self.download_jobs(directory, &profile);
        status.emit("Checking game assets...");
        jobs.extend(self.asset_jobs(&client, directory, &profile).await?);
        self.download_all(&client, jobs, status).await?;

        status.emit("Extracting native libraries...");
        let count = self.extract_natives(directory, &profile)?;
        info!("Extracted {} native files for {}", count, profile.id);
        Ok(())
    }
}

impl GameLibrary for MinecraftLibrary {
    fn ensure_installed(&self, version: &str, directory: &Path, status: &StatusSender) -> Result<()> {
        // Runs on a worker thread, so a private runtime is safe here.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.install(version, directory, status))
    }

    fn is_version_installed(&self, version: &str, directory: &Path) -> bool {
        version_json_path(directory, version).is_file()
    }

    fn build_launch_command(
        &self,
        version: &str,
        directory: &Path,
        options: &LaunchOptions,
    ) -> Result<Vec<String>> {
        let profile = self.resolve(directory, version)?;
        self.command_for(&profile, directory, options)
    }
}

async fn download(client: &reqwest::Client, job: &DownloadJob) -> Result<()> {
    debug!("Downloading {} -> {}", job.url, job.path.display());
    let bytes = client
        .get(&job.url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    if let Some(parent) = job.path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let partial = job.partial_path();
    tokio::fs::write(&partial, &bytes).await?;
    tokio::fs::rename(&partial, &job.path).await?;
    Ok(())
}

fn substitute(template: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn extract_archive(archive_path: &Path, destination: &Path, excludes: &[String]) -> Result<usize> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut extracted = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        let excluded = excludes.iter().any(|ex| name.starts_with(ex.as_str()));
        if entry.is_dir() || name.starts_with("META-INF/") || excluded {
            continue;
        }
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };

        let out_path = destination.join(relative);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = std::fs::File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out)?;
        extracted += 1;
    }
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const VANILLA: &str = r#"{
        "id": "1.8.8",
        "type": "release",
        "mainClass": "net.minecraft.client.main.Main",
        "minecraftArguments": "--username ${auth_player_name} --version ${version_name} --gameDir ${game_directory} --assetsDir ${assets_root} --assetIndex ${assets_index_name} --uuid ${auth_uuid} --accessToken ${auth_access_token} --userProperties ${user_properties} --userType ${user_type}",
        "assetIndex": {"id": "1.8", "url": "https://example.invalid/1.8.json", "size": 10},
        "downloads": {"client": {"url": "https://example.invalid/client.jar", "size": 5}},
        "libraries": [
            {"name": "com.mojang:authlib:1.5.21",
             "downloads": {"artifact": {"path": "com/mojang/authlib/1.5.21/authlib-1.5.21.jar", "url": "https://libraries.minecraft.net/com/mojang/authlib/1.5.21/authlib-1.5.21.jar", "size": 3}}},
            {"name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.4",
             "natives": {"linux": "natives-linux", "windows": "natives-windows", "osx": "natives-osx"},
             "extract": {"exclude": ["META-INF/"]}},
            {"name": "tv.twitch:twitch-external-platform:4.5",
             "rules": [{"action": "allow", "os": {"name": "windows"}}],
             "natives": {"windows": "natives-windows-${arch}"}}
        ]
    }"#;

    const FORGE: &str = r#"{
        "id": "1.8.8-forge1.8.8-11.15.0.1655",
        "inheritsFrom": "1.8.8",
        "jar": "1.8.8",
        "mainClass": "net.minecraft.launchwrapper.Launch",
        "minecraftArguments": "--username ${auth_player_name} --version ${version_name} --tweakClass net.minecraftforge.fml.common.launcher.FMLTweaker",
        "libraries": [
            {"name": "net.minecraftforge:forge:1.8.8-11.15.0.1655", "url": "http://files.minecraftforge.net/maven/"},
            {"name": "net.minecraft:launchwrapper:1.12"}
        ]
    }"#;

    fn write_profile(dir: &Path, id: &str, json: &str) {
        let path = version_json_path(dir, id);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, json).unwrap();
    }

    fn library_for(os: &'static str) -> MinecraftLibrary {
        MinecraftLibrary {
            os,
            ..MinecraftLibrary::new()
        }
    }

    fn options(dir: &Path) -> LaunchOptions {
        LaunchOptions {
            username: "Steve".to_string(),
            uuid: "00000000-0000-4000-8000-000000000000".to_string(),
            token: "0".to_string(),
            game_directory: dir.to_path_buf(),
            version: "1.8.8-forge1.8.8-11.15.0.1655".to_string(),
            jvm_arguments: vec!["-Xmx4G".to_string(), "-Xms2G".to_string()],
            executable_path: None,
        }
    }

    fn rule(json: &str) -> Rule {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn rules_follow_last_match() {
        assert!(rules_allow(&[], "linux"));

        let only_osx = vec![rule(r#"{"action": "allow", "os": {"name": "osx"}}"#)];
        assert!(rules_allow(&only_osx, "osx"));
        assert!(!rules_allow(&only_osx, "linux"));

        let all_but_osx = vec![
            rule(r#"{"action": "allow"}"#),
            rule(r#"{"action": "disallow", "os": {"name": "osx"}}"#),
        ];
        assert!(rules_allow(&all_but_osx, "linux"));
        assert!(!rules_allow(&all_but_osx, "osx"));
    }

    #[test]
    fn feature_rules_never_match() {
        let demo = vec![rule(r#"{"action": "allow", "features": {"is_demo_user": true}}"#)];
        assert!(!rules_allow(&demo, "linux"));
    }

    #[test]
    fn placeholders_are_substituted_and_unknown_ones_kept() {
        let values = HashMap::from([("auth_player_name", "Steve".to_string())]);
        assert_eq!(substitute("--username ${auth_player_name}", &values), "--username Steve");
        assert_eq!(substitute("${mystery}", &values), "${mystery}");
        assert_eq!(substitute("plain", &values), "plain");
    }

    #[test]
    fn forge_profile_inherits_from_vanilla() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "1.8.8", VANILLA);
        write_profile(dir.path(), "1.8.8-forge1.8.8-11.15.0.1655", FORGE);

        let profile = library_for("linux")
            .resolve(dir.path(), "1.8.8-forge1.8.8-11.15.0.1655")
            .unwrap();

        assert_eq!(profile.id, "1.8.8-forge1.8.8-11.15.0.1655");
        assert_eq!(profile.main_class.as_deref(), Some("net.minecraft.launchwrapper.Launch"));
        assert_eq!(profile.jar.as_deref(), Some("1.8.8"));
        assert_eq!(profile.asset_index.as_ref().map(|i| i.id.as_str()), Some("1.8"));
        let names: Vec<_> = profile.libraries.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "net.minecraftforge:forge:1.8.8-11.15.0.1655",
                "net.minecraft:launchwrapper:1.12",
                "com.mojang:authlib:1.5.21",
                "org.lwjgl.lwjgl:lwjgl-platform:2.9.4",
                "tv.twitch:twitch-external-platform:4.5",
            ]
        );
    }

    #[test]
    fn legacy_command_has_classpath_and_substituted_arguments() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "1.8.8", VANILLA);
        write_profile(dir.path(), "1.8.8-forge1.8.8-11.15.0.1655", FORGE);
        let lib = library_for("linux");

        let command = lib
            .build_launch_command("1.8.8-forge1.8.8-11.15.0.1655", dir.path(), &options(dir.path()))
            .unwrap();

        assert_eq!(&command[..3], &["java", "-Xmx4G", "-Xms2G"]);
        let natives = dir.path().join("versions/1.8.8-forge1.8.8-11.15.0.1655/natives");
        assert_eq!(command[3], format!("-Djava.library.path={}", natives.display()));
        assert_eq!(command[4], "-cp");

        let classpath: Vec<&str> = command[5].split(if cfg!(windows) { ';' } else { ':' }).collect();
        let libraries = dir.path().join("libraries");
        assert_eq!(
            classpath,
            vec![
                libraries.join("net/minecraftforge/forge/1.8.8-11.15.0.1655/forge-1.8.8-11.15.0.1655.jar").display().to_string(),
                libraries.join("net/minecraft/launchwrapper/1.12/launchwrapper-1.12.jar").display().to_string(),
                libraries.join("com/mojang/authlib/1.5.21/authlib-1.5.21.jar").display().to_string(),
                dir.path().join("versions/1.8.8/1.8.8.jar").display().to_string(),
            ]
        );

        assert_eq!(command[6], "net.minecraft.launchwrapper.Launch");
        assert_eq!(
            &command[7..],
            &[
                "--username",
                "Steve",
                "--version",
                "1.8.8-forge1.8.8-11.15.0.1655",
                "--tweakClass",
                "net.minecraftforge.fml.common.launcher.FMLTweaker",
            ]
        );
    }

    #[test]
    fn modern_arguments_respect_rules() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(
            dir.path(),
            "1.20.1",
            r#"{
                "id": "1.20.1",
                "mainClass": "net.minecraft.client.main.Main",
                "arguments": {
                    "game": ["--username", "${auth_player_name}",
                             {"rules": [{"action": "allow", "features": {"is_demo_user": true}}], "value": "--demo"}],
                    "jvm": [{"rules": [{"action": "allow", "os": {"name": "osx"}}], "value": ["-XstartOnFirstThread"]},
                            "-Djava.library.path=${natives_directory}", "-cp", "${classpath}"]
                },
                "libraries": []
            }"#,
        );
        let mut opts = options(dir.path());
        opts.version = "1.20.1".to_string();
        opts.executable_path = Some(PathBuf::from("/opt/jdk/bin/java"));

        let command = library_for("linux")
            .build_launch_command("1.20.1", dir.path(), &opts)
            .unwrap();

        assert_eq!(command[0], "/opt/jdk/bin/java");
        assert!(!command.contains(&"-XstartOnFirstThread".to_string()));
        assert!(!command.contains(&"--demo".to_string()));
        assert_eq!(&command[command.len() - 2..], &["--username", "Steve"]);
        assert_eq!(command[6], "net.minecraft.client.main.Main");
    }

    #[test]
    fn profile_without_main_class_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "broken", r#"{"id": "broken"}"#);

        let err = library_for("linux")
            .build_launch_command("broken", dir.path(), &options(dir.path()))
            .unwrap_err();

        assert!(matches!(err, LauncherError::VersionMetadata(_)));
    }

    #[test]
    fn installed_means_profile_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library_for("linux");
        assert!(!lib.is_version_installed("1.8.8", dir.path()));

        write_profile(dir.path(), "1.8.8", VANILLA);
        assert!(lib.is_version_installed("1.8.8", dir.path()));
    }

    #[test]
    fn download_jobs_cover_client_libraries_and_natives() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "1.8.8", VANILLA);
        write_profile(dir.path(), "1.8.8-forge1.8.8-11.15.0.1655", FORGE);
        let lib = library_for("linux");
        let profile = lib.resolve(dir.path(), "1.8.8-forge1.8.8-11.15.0.1655").unwrap();

        let jobs = lib.download_jobs(dir.path(), &profile);
        let urls: Vec<_> = jobs.iter().map(|j| j.url.as_str()).collect();

        assert_eq!(
            urls,
            vec![
                "https://example.invalid/client.jar",
                "https://maven.minecraftforge.net/net/minecraftforge/forge/1.8.8-11.15.0.1655/forge-1.8.8-11.15.0.1655.jar",
                "https://libraries.minecraft.net/net/minecraft/launchwrapper/1.12/launchwrapper-1.12.jar",
                "https://libraries.minecraft.net/com/mojang/authlib/1.5.21/authlib-1.5.21.jar",
                "https://libraries.minecraft.net/org/lwjgl/lwjgl/lwjgl-platform/2.9.4/lwjgl-platform-2.9.4-natives-linux.jar",
            ]
        );
        assert!(!jobs[1].required);
        assert!(jobs[3].required);
        assert_eq!(jobs[0].path, dir.path().join("versions/1.8.8/1.8.8.jar"));
    }

    #[test]
    fn present_files_with_matching_size_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.jar");
        std::fs::write(&path, b"abc").unwrap();

        let job = |size| DownloadJob {
            url: String::new(),
            path: path.clone(),
            size,
            required: true,
        };

        assert!(job(Some(3)).is_satisfied());
        assert!(job(None).is_satisfied());
        assert!(!job(Some(4)).is_satisfied());
        assert!(!DownloadJob { path: dir.path().join("absent"), ..job(None) }.is_satisfied());
    }

    #[test]
    fn natives_are_extracted_without_excluded_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("natives.jar");
        {
            let mut writer = zip::ZipWriter::new(std::fs::File::create(&archive).unwrap());
            let opts = zip::write::SimpleFileOptions::default();
            writer.start_file("META-INF/MANIFEST.MF", opts).unwrap();
            writer.write_all(b"Manifest-Version: 1.0").unwrap();
            writer.start_file("liblwjgl64.so", opts).unwrap();
            writer.write_all(b"elf").unwrap();
            writer.start_file("skip/me.txt", opts).unwrap();
            writer.write_all(b"no").unwrap();
            writer.finish().unwrap();
        }
        let out = dir.path().join("natives");
        std::fs::create_dir_all(&out).unwrap();

        let count = extract_archive(&archive, &out, &["skip/".to_string()]).unwrap();

        assert_eq!(count, 1);
        assert_eq!(std::fs::read(out.join("liblwjgl64.so")).unwrap(), b"elf");
        assert!(!out.join("META-INF").exists());
        assert!(!out.join("skip").exists());
    }

    #[test]
    fn jobs_for_one_file_collapse_to_the_strongest() {
        let job = |url: &str, path: &str, size, required| DownloadJob {
            url: url.to_string(),
            path: PathBuf::from(path),
            size,
            required,
        };
        let jobs = vec![
            job("maven", "libs/guava-17.0.jar", None, false),
            job("client", "versions/1.8.8.jar", Some(6), true),
            job("mojang", "libs/guava-17.0.jar", Some(5), true),
            job("again", "libs/guava-17.0.jar", None, true),
        ];

        assert_eq!(
            dedupe_jobs(jobs),
            vec![
                job("mojang", "libs/guava-17.0.jar", Some(5), true),
                job("client", "versions/1.8.8.jar", Some(6), true),
            ]
        );
    }

    #[test]
    fn partial_files_keep_the_full_name() {
        let job = |path: &str| DownloadJob {
            url: String::new(),
            path: PathBuf::from(path),
            size: None,
            required: true,
        };

        assert_eq!(job("libs/a-1.0.jar").partial_path(), PathBuf::from("libs/a-1.0.jar.part"));
        assert_ne!(job("libs/a-1.0.jar").partial_path(), job("libs/a-1.0.pom").partial_path());
    }

    /// HTTP/1.1 file server on its own runtime; unknown paths answer 404.
    struct FileServer {
        base: String,
        _runtime: tokio::runtime::Runtime,
    }

    impl FileServer {
        fn start(routes: impl FnOnce(&str) -> HashMap<String, Vec<u8>>) -> Self {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();
            let listener = runtime
                .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
                .unwrap();
            let base = format!("http://{}", listener.local_addr().unwrap());
            let routes = std::sync::Arc::new(routes(&base));
            runtime.spawn(async move {
                while let Ok((socket, _)) = listener.accept().await {
                    tokio::spawn(respond(socket, std::sync::Arc::clone(&routes)));
                }
            });
            Self {
                base,
                _runtime: runtime,
            }
        }

        fn library(&self) -> MinecraftLibrary {
            MinecraftLibrary::new()
                .with_manifest_url(format!("{}/manifest.json", self.base))
                .with_resources_url(format!("{}/res", self.base))
        }
    }

    async fn respond(
        mut socket: tokio::net::TcpStream,
        routes: std::sync::Arc<HashMap<String, Vec<u8>>>,
    ) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&chunk[..n]),
            }
        }
        let head = String::from_utf8_lossy(&request);
        let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
        let (status_line, body) = match routes.get(&path) {
            Some(body) => ("200 OK", body.clone()),
            None => ("404 Not Found", Vec::new()),
        };
        let header = format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = socket.write_all(header.as_bytes()).await;
        let _ = socket.write_all(&body).await;
        let _ = socket.shutdown().await;
    }

    const ASSET_HASH: &str = "ab34c1f0e6aa5b0a7c3bd18d0eeb1b2f3c4d5e6f";

    fn served_game(base: &str) -> HashMap<String, Vec<u8>> {
        let manifest = format!(
            r#"{{"versions": [{{"id": "1.8.8", "url": "{base}/versions/1.8.8.json"}}]}}"#
        );
        let vanilla = format!(
            r#"{{
                "id": "1.8.8",
                "mainClass": "net.minecraft.client.main.Main",
                "minecraftArguments": "--username ${{auth_player_name}}",
                "assetIndex": {{"id": "1.8", "url": "{base}/indexes/1.8.json"}},
                "downloads": {{"client": {{"url": "{base}/client.jar", "size": 6}}}},
                "libraries": [
                    {{"name": "com.google.guava:guava:17.0",
                      "downloads": {{"artifact": {{"path": "com/google/guava/guava/17.0/guava-17.0.jar", "url": "{base}/libs/guava-17.0.jar", "size": 5}}}}}}
                ]
            }}"#
        );
        // The same object under two names, as Mojang indexes do for shared sounds.
        let index = format!(
            r#"{{"objects": {{
                "sounds/a.ogg": {{"hash": "{ASSET_HASH}", "size": 4}},
                "sounds/b.ogg": {{"hash": "{ASSET_HASH}", "size": 4}}
            }}}}"#
        );

        HashMap::from([
            ("/manifest.json".to_string(), manifest.into_bytes()),
            ("/versions/1.8.8.json".to_string(), vanilla.into_bytes()),
            ("/indexes/1.8.json".to_string(), index.into_bytes()),
            ("/client.jar".to_string(), b"client".to_vec()),
            ("/libs/guava-17.0.jar".to_string(), b"guava".to_vec()),
            (format!("/res/ab/{ASSET_HASH}"), b"ogg!".to_vec()),
        ])
    }

    /// Forge repeats vanilla libraries; here through its own maven repository.
    fn forge_repeating_guava(base: &str) -> String {
        format!(
            r#"{{
                "id": "1.8.8-forge",
                "inheritsFrom": "1.8.8",
                "jar": "1.8.8",
                "mainClass": "net.minecraft.launchwrapper.Launch",
                "minecraftArguments": "--username ${{auth_player_name}} --tweakClass net.minecraftforge.fml.common.launcher.FMLTweaker",
                "libraries": [
                    {{"name": "com.google.guava:guava:17.0", "url": "{base}/maven/"}}
                ]
            }}"#
        )
    }

    fn texts(rx: &std::sync::mpsc::Receiver<crate::status::StatusMessage>) -> Vec<String> {
        crate::status::drain(rx).into_iter().map(|m| m.text).collect()
    }

    #[test]
    fn fresh_install_lays_out_game_files_and_reruns_are_noops() {
        let server = FileServer::start(served_game);
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "1.8.8-forge", &forge_repeating_guava(&server.base));
        let lib = server.library();
        let (tx, rx) = crate::status::channel(crate::status::Workflow::Installer);

        lib.ensure_installed("1.8.8-forge", dir.path(), &tx).unwrap();

        let messages = texts(&rx);
        assert!(messages.contains(&"Downloading 3 files (0 already present)...".to_string()));
        assert!(!messages.iter().any(|m| m.starts_with("Warning")));

        let guava = dir.path().join("libraries/com/google/guava/guava/17.0/guava-17.0.jar");
        assert!(version_json_path(dir.path(), "1.8.8").is_file());
        assert_eq!(std::fs::read(dir.path().join("versions/1.8.8/1.8.8.jar")).unwrap(), b"client");
        assert_eq!(std::fs::read(&guava).unwrap(), b"guava");
        assert!(dir.path().join("assets/indexes/1.8.json").is_file());
        assert_eq!(
            std::fs::read(dir.path().join("assets/objects/ab").join(ASSET_HASH)).unwrap(),
            b"ogg!"
        );
        let leftovers: Vec<_> = std::fs::read_dir(guava.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("guava-17.0.jar")]);

        lib.ensure_installed("1.8.8-forge", dir.path(), &tx).unwrap();
        assert!(texts(&rx).contains(&"All 3 game files are already present.".to_string()));

        let command = lib
            .build_launch_command("1.8.8-forge", dir.path(), &options(dir.path()))
            .unwrap();
        let classpath = &command[command.iter().position(|arg| arg == "-cp").unwrap() + 1];
        assert_eq!(classpath.matches("guava-17.0.jar").count(), 1);
    }

    #[test]
    fn version_missing_from_manifest_fails_the_install() {
        let server = FileServer::start(served_game);
        let dir = tempfile::tempdir().unwrap();
        let installer = crate::installer::Installer::new(std::sync::Arc::new(server.library()));
        let (tx, _rx) = crate::status::channel(crate::status::Workflow::Installer);

        let result = installer.run("1.8.9", dir.path(), &tx);

        assert!(!result.success);
        assert!(result.error_message.contains("1.8.9"));
        assert!(result.error_message.contains("not in the version manifest"));
    }

    #[test]
    fn missing_optional_library_only_warns() {
        let server = FileServer::start(|_| HashMap::new());
        let dir = tempfile::tempdir().unwrap();
        let profile = format!(
            r#"{{
                "id": "custom",
                "mainClass": "net.minecraft.launchwrapper.Launch",
                "libraries": [
                    {{"name": "net.minecraftforge:forge:1.8.8-11.15.0.1655", "url": "{}/maven/"}}
                ]
            }}"#,
            server.base
        );
        write_profile(dir.path(), "custom", &profile);
        let (tx, rx) = crate::status::channel(crate::status::Workflow::Installer);

        server.library().ensure_installed("custom", dir.path(), &tx).unwrap();

        let expected = format!(
            "Warning: could not download {}/maven/net/minecraftforge/forge/1.8.8-11.15.0.1655/forge-1.8.8-11.15.0.1655.jar",
            server.base
        );
        assert!(texts(&rx).contains(&expected));
    }
}
