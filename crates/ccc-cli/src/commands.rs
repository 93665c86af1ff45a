use std::env;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, trace};

use ccc_cli::logging::redact_value;
use ccc_cli::summary::domains_table;
use ccc_client::{
    AUTH_TOKEN_ENV_VAR, DocumentStore, DtsClient, DtsConfig, ElasticsearchStore, EveMongoStore,
    SearchConfig, SubmissionConfig, infer_ccc_id, parse_auth_token, site_url,
};
use ccc_schema::SchemaRegistry;
use ccc_transform::{
    BatchImporter, IdentityPolicy, ImportMode, ImportedRecord, NormalizeContext, ResourceRequest,
    RowNormalizer, publish_resource,
};

use crate::cli::{
    BackendArg, DomainsArgs, InferCccIdArgs, PublishBatchArgs, PublishResourceArgs, TargetArgs,
};

/// Records produced by a publish command.
pub struct PublishOutcome {
    pub mode: ImportMode,
    pub records: Vec<ImportedRecord>,
}

pub fn run_publish_batch(args: &PublishBatchArgs) -> Result<PublishOutcome> {
    let target = &args.target;
    let registry = load_registry(target.domain_json.as_deref())?;
    let context = normalize_context(target)?;
    let token = resolve_auth_token(target.auth_token.as_deref())?;
    let identity = dts_client(target, &token)?;
    let store = document_store(target, &token)?;

    let normalizer = RowNormalizer::new(
        &registry,
        &args.domain,
        context,
        &identity,
        store.as_ref(),
    )?;
    let mode = import_mode(target);
    let importer = BatchImporter::new(normalizer, mode);
    let records = importer
        .import_file(&args.tsv)
        .with_context(|| format!("import {} into {}", args.tsv.display(), args.domain))?;
    trace_records(&records);
    Ok(PublishOutcome { mode, records })
}

pub fn run_publish_resource(args: &PublishResourceArgs) -> Result<PublishOutcome> {
    let target = &args.target;
    let registry = load_registry(target.domain_json.as_deref())?;
    let context = normalize_context(target)?;
    let token = resolve_auth_token(target.auth_token.as_deref())?;
    let identity = dts_client(target, &token)?;
    let store = document_store(target, &token)?;

    let normalizer = RowNormalizer::new(
        &registry,
        &args.domain,
        context,
        &identity,
        store.as_ref(),
    )?;
    let mode = import_mode(target);
    let importer = BatchImporter::new(normalizer, mode);
    let request = ResourceRequest {
        workflow_id: args.workflow_id.clone(),
        mimetype: args.mimetype.clone(),
        inherit_from: args.inherit_from.clone(),
        properties: args.properties.clone(),
        ..ResourceRequest::new(args.filepath.as_str())
    };
    let record = publish_resource(&importer, &request)
        .with_context(|| format!("publish resource {}", args.filepath))?;
    let records = vec![record];
    trace_records(&records);
    Ok(PublishOutcome { mode, records })
}

pub fn run_infer_ccc_id(args: &InferCccIdArgs) -> Result<()> {
    for path in &args.paths {
        let ccc_id = infer_ccc_id(path, args.strategy)
            .with_context(|| format!("infer CCC_ID of {}", path.display()))?;
        println!("{ccc_id}\t{}", path.display());
    }
    Ok(())
}

pub fn run_domains(args: &DomainsArgs) -> Result<()> {
    let registry = load_registry(args.domain_json.as_deref())?;
    println!("{}", domains_table(&registry));
    Ok(())
}

fn load_registry(domain_json: Option<&Path>) -> Result<SchemaRegistry> {
    let registry = match domain_json {
        Some(path) => SchemaRegistry::load(path)
            .with_context(|| format!("load domain schema {}", path.display()))?,
        None => SchemaRegistry::load_default().context("load domain schema")?,
    };
    info!(domains = registry.len(), "loaded domain schema");
    Ok(registry)
}

/// Only registration sends the site to the file service, so other policies
/// accept any site name.
fn normalize_context(target: &TargetArgs) -> Result<NormalizeContext> {
    let policy = identity_policy(target);
    if policy == IdentityPolicy::Register {
        site_url(&target.site)?;
    }
    let user = resolve_user(target.user.as_deref())?;
    Ok(NormalizeContext::new(&target.site, user, &target.project).with_identity_policy(policy))
}

fn resolve_user(explicit: Option<&str>) -> Result<String> {
    if let Some(user) = explicit {
        return Ok(user.to_string());
    }
    match env::var("USER") {
        Ok(user) if !user.is_empty() => Ok(user),
        _ => bail!("no user given; pass --user or set USER"),
    }
}

fn resolve_auth_token(explicit: Option<&str>) -> Result<String> {
    let raw = match explicit {
        Some(token) => token.to_string(),
        None => env::var(AUTH_TOKEN_ENV_VAR).unwrap_or_default(),
    };
    if raw.is_empty() {
        return Ok(raw);
    }
    parse_auth_token(&raw).context("read auth token")
}

pub(crate) fn identity_policy(target: &TargetArgs) -> IdentityPolicy {
    if target.mock || target.skip_dts_registration {
        IdentityPolicy::SkipWithPlaceholder
    } else if target.validate_only {
        IdentityPolicy::ValidateOnly
    } else {
        IdentityPolicy::Register
    }
}

pub(crate) fn import_mode(target: &TargetArgs) -> ImportMode {
    if target.mock {
        ImportMode::DryRun
    } else {
        ImportMode::Write
    }
}

fn dts_client(target: &TargetArgs, token: &str) -> Result<DtsClient> {
    let mut config = DtsConfig::default().with_auth_token(token);
    if let Some(host) = &target.dts_host {
        config = config.with_host(host);
    }
    if let Some(port) = target.dts_port {
        config = config.with_port(port);
    }
    DtsClient::new(config).context("create file service client")
}

fn document_store(target: &TargetArgs, token: &str) -> Result<Box<dyn DocumentStore>> {
    let store: Box<dyn DocumentStore> = match target.backend {
        BackendArg::Elasticsearch => {
            let mut config = SearchConfig::default().with_auth_token(token);
            if let Some(host) = &target.host {
                config = config.with_host(host);
            }
            if let Some(port) = target.port {
                config = config.with_port(port);
            }
            Box::new(ElasticsearchStore::new(config).context("create search client")?)
        }
        BackendArg::EveMongo => {
            let mut config = SubmissionConfig::default()
                .with_auth_token(token)
                .with_program(&target.program);
            if let Some(host) = &target.host {
                config = config.with_host(host);
            }
            if let Some(port) = target.port {
                config = config.with_port(port);
            }
            Box::new(
                EveMongoStore::new(config, &target.project)
                    .context("create submission client")?,
            )
        }
    };
    Ok(store)
}

fn trace_records(records: &[ImportedRecord]) {
    for imported in records {
        let json = serde_json::to_string(&imported.record).unwrap_or_default();
        trace!(key = %imported.key, record = redact_value(&json), "normalized record");
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Command};

    fn target(extra: &[&str]) -> TargetArgs {
        let mut args = vec![
            "ccc",
            "publish-batch",
            "--tsv",
            "rows.tsv",
            "--domain",
            "resource",
            "--site",
            "ohsu",
            "--project",
            "proj",
        ];
        args.extend_from_slice(extra);
        match Cli::try_parse_from(args).expect("arguments parse").command {
            Command::PublishBatch(args) => args.target,
            _ => panic!("expected publish-batch"),
        }
    }

    #[test]
    fn mock_is_a_dry_run_with_placeholders() {
        let target = target(&["--mock"]);
        assert_eq!(import_mode(&target), ImportMode::DryRun);
        assert_eq!(identity_policy(&target), IdentityPolicy::SkipWithPlaceholder);
    }

    #[test]
    fn flags_select_the_identity_policy() {
        assert_eq!(identity_policy(&target(&[])), IdentityPolicy::Register);
        assert_eq!(
            identity_policy(&target(&["--validate-only"])),
            IdentityPolicy::ValidateOnly
        );
        let skip = target(&["--skip-dts-registration"]);
        assert_eq!(identity_policy(&skip), IdentityPolicy::SkipWithPlaceholder);
        assert_eq!(import_mode(&skip), ImportMode::Write);
    }

    #[test]
    fn explicit_user_wins() {
        assert_eq!(resolve_user(Some("alice")).unwrap(), "alice");
    }

    #[test]
    fn literal_tokens_pass_through() {
        assert_eq!(resolve_auth_token(Some("secret")).unwrap(), "secret");
    }

    #[test]
    fn unknown_site_is_rejected_before_any_work() {
        let mut target = target(&[]);
        target.site = "mars".to_string();
        let err = normalize_context(&target).unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"unknown site mars; valid sites are: central, ohsu, dfci, oicr"
        );
    }

    #[test]
    fn any_site_is_accepted_without_registration() {
        for flag in ["--mock", "--skip-dts-registration", "--validate-only"] {
            let mut target = target(&[flag, "--user", "alice"]);
            target.site = "mars".to_string();
            let context = normalize_context(&target).expect(flag);
            assert_ne!(context.identity, IdentityPolicy::Register);
        }
    }
}
