//! Builds the diagram pipeline from loaded configuration.

use mdkroki_cache::{CacheSettings, DiagramCache, TieredCache};
use mdkroki_config::Config;
use mdkroki_diagrams::{
    DiagramFamily, DiagramProcessor, DiagramTypes, HttpMethod, KrokiRenderer, TagFormat,
    TypesConfig,
};
use mdkroki_fence::Scanner;

use crate::error::CliError;

/// Diagram type table for the configured families and file types.
pub(crate) fn diagram_types(config: &Config) -> Result<DiagramTypes, CliError> {
    let diagrams = &config.diagrams;
    let enabled = diagrams.enabled_families();
    let types_config = TypesConfig {
        fence_prefix: diagrams.fence_prefix.clone(),
        file_types: diagrams.file_types.clone(),
        file_type_overrides: diagrams.file_type_overrides.clone(),
        enabled_families: DiagramFamily::OPTIONAL
            .into_iter()
            .filter(|family| enabled.contains(&family.as_str()))
            .collect(),
    };
    Ok(DiagramTypes::new(&types_config)?)
}

/// Kroki renderer for the configured server.
pub(crate) fn renderer(config: &Config) -> Result<KrokiRenderer, CliError> {
    let kroki = &config.kroki;
    let method = HttpMethod::parse(&kroki.http_method).ok_or_else(|| {
        CliError::Validation(format!("unknown HTTP method: {}", kroki.http_method))
    })?;

    let mut renderer = KrokiRenderer::new(kroki.server_url.as_str())
        .method(method)
        .timeout(kroki.timeout());
    if let Some(user_agent) = &kroki.user_agent {
        renderer = renderer.user_agent(user_agent.as_str());
    }
    Ok(renderer)
}

/// Two-tier cache, or memory only when the disk cache is disabled.
pub(crate) fn cache(config: &Config) -> TieredCache {
    let cache = &config.cache_resolved;
    if !cache.enabled {
        return TieredCache::memory_only();
    }
    TieredCache::open(&CacheSettings {
        dir: cache.dir.clone(),
        retention: cache.retention(),
    })
}

/// Fully configured document processor.
pub(crate) fn processor(config: &Config) -> Result<DiagramProcessor, CliError> {
    let diagrams = &config.diagrams;
    let tag_format = TagFormat::parse(&diagrams.tag_format).ok_or_else(|| {
        CliError::Validation(format!("unknown tag format: {}", diagrams.tag_format))
    })?;

    let cache: Box<dyn DiagramCache> = Box::new(cache(config));
    let mut processor = DiagramProcessor::new(diagram_types(config)?, Box::new(renderer(config)?))
        .with_cache(cache)
        .doc_root(config.docs_resolved.root.clone())
        .tag_format(tag_format)
        .fail_fast(diagrams.fail_fast)
        .scanner(Scanner::new().max_indent(diagrams.fence_max_indent));
    if let Some(threads) = diagrams.max_concurrency {
        processor = processor.max_concurrency(threads);
    }
    Ok(processor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn load(toml: &str) -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mdkroki.toml");
        std::fs::write(&path, toml).unwrap();
        let config = Config::load(Some(&path), None).unwrap();
        (tmp, config)
    }

    #[test]
    fn test_disabled_family_is_not_resolved() {
        let (_tmp, config) = load("[diagrams]\nenable_mermaid = false\n");
        let types = diagram_types(&config).unwrap();

        assert!(types.resolve("mermaid").is_none());
        assert!(types.resolve("plantuml").is_some());
    }

    #[test]
    fn test_prefix_and_overrides() {
        let (_tmp, config) = load(
            "[diagrams]\nfence_prefix = \"kroki-\"\nfile_types = [\"png\", \"svg\"]\nfile_type_overrides = { graphviz = \"svg\" }\n",
        );
        let types = diagram_types(&config).unwrap();

        assert!(types.resolve("graphviz").is_none());
        assert_eq!(types.resolve("kroki-graphviz").unwrap().extension(), "svg");
        assert_eq!(types.resolve("Kroki-PlantUML").unwrap().extension(), "png");
    }

    #[test]
    fn test_bad_override_is_resolver_error() {
        let (_tmp, config) = load("[diagrams]\nfile_type_overrides = { mermaid = \"gif\" }\n");
        let err = diagram_types(&config).unwrap_err();

        assert!(matches!(err, CliError::Resolver(_)), "{err:?}");
    }

    #[test]
    fn test_renderer_from_config() {
        let (_tmp, config) = load(
            "[kroki]\nserver_url = \"http://localhost:8000/\"\nhttp_method = \"get\"\ntimeout_secs = 7\n",
        );
        let renderer = renderer(&config).unwrap();

        assert_eq!(renderer.server_url(), "http://localhost:8000");
        assert_eq!(renderer.http_method(), HttpMethod::Get);
        assert_eq!(renderer.request_timeout(), std::time::Duration::from_secs(7));
    }

    #[test]
    fn test_cache_disabled_has_no_disk_tier() {
        let (_tmp, mut config) = load("");
        config.cache_resolved.enabled = false;

        assert_eq!(cache(&config).disk_dir(), None);
    }

    #[test]
    fn test_cache_dir_from_config() {
        let (tmp, config) = load("[cache]\ndir = \"diagram-cache\"\n");

        let cache = cache(&config);
        assert_eq!(
            cache.disk_dir(),
            Some(tmp.path().join("diagram-cache").as_path())
        );
        assert!(tmp.path().join("diagram-cache").is_dir());
    }

    #[test]
    fn test_processor_with_get_renders_without_network() {
        let (_tmp, config) = load(
            "[kroki]\nhttp_method = \"GET\"\n\n[cache]\nenabled = false\n",
        );
        let processor = processor(&config).unwrap();

        let out = processor
            .process_document("# Title\n\n```mermaid\ngraph TD\n```\n")
            .unwrap();
        assert!(
            out.starts_with("# Title\n\n<img alt=\"Kroki\" src=\"https://kroki.io/mermaid/svg/"),
            "{out}"
        );
    }
}
