use crate::support::{fail, load_blueprint, load_chunks, load_config, print_json};
use bpaudit_core::{AuditInputs, Auditor, RouteSource, ScanDocument, render_text};
use bpaudit_scan::Framework;
use std::path::PathBuf;

pub struct Args {
    pub blueprint: Option<String>,
    pub chunks: Vec<String>,
    pub chunks_dir: Option<String>,
    pub source_scan: Option<String>,
    pub scan_nextjs: Option<String>,
    pub scan_express: Option<String>,
    pub prefix: Option<String>,
    pub config: Option<String>,
    pub json: bool,
}

/// At most one route source; command-line flags win over `[inputs]`.
fn select_route_source(args: &Args, configured: Option<PathBuf>) -> Option<Box<dyn RouteSource>> {
    let prefix = args.prefix.as_deref();
    let mut selected: Vec<Box<dyn RouteSource>> = Vec::new();
    if let Some(path) = &args.source_scan {
        selected.push(Box::new(ScanDocument::new(path)));
    }
    if let Some(root) = &args.scan_nextjs {
        selected.push(Framework::NextJs.source(root, prefix));
    }
    if let Some(root) = &args.scan_express {
        selected.push(Framework::Express.source(root, prefix));
    }
    if selected.len() > 1 {
        fail("--source-scan, --scan-nextjs and --scan-express are mutually exclusive");
    }
    selected
        .pop()
        .or_else(|| configured.map(|path| Box::new(ScanDocument::new(path)) as Box<dyn RouteSource>))
}

pub fn run(args: Args) {
    let config = load_config(args.config.as_deref());
    let inputs = &config.inputs;

    let Some(blueprint_path) = args
        .blueprint
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| inputs.blueprint.clone())
    else {
        fail("no blueprint given; pass --blueprint or set [inputs].blueprint");
    };
    let blueprint = load_blueprint(&blueprint_path);

    let chunk_files: Vec<PathBuf> = if args.chunks.is_empty() {
        inputs.chunks.clone()
    } else {
        args.chunks.iter().map(PathBuf::from).collect()
    };
    let chunks_dir = args
        .chunks_dir
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| inputs.chunks_dir.clone());
    let chunks = load_chunks(&chunk_files, chunks_dir.as_deref());

    let route_source = select_route_source(&args, inputs.source_scan.clone());
    let mut audit_inputs = AuditInputs::new(&blueprint).with_chunks(&chunks);
    if let Some(source) = route_source.as_deref() {
        audit_inputs = audit_inputs.with_route_source(source);
    }

    let report = Auditor::new(config.rules.clone())
        .audit(audit_inputs)
        .unwrap_or_else(|err| fail(err));

    if args.json {
        print_json(&report, "audit report");
    } else {
        println!("{}", render_text(&report));
    }
    if report.has_blocking() {
        std::process::exit(1);
    }
}
