use crate::cli::FrameworkArg;
use crate::support::fail;
use bpaudit_model::ScannedRoute;
use bpaudit_scan::Framework;
use serde::Serialize;

const SCAN_SCHEMA: u32 = 1;
const SCAN_KIND: &str = "bpaudit.scan.v1";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanPayload<'a> {
    schema: u32,
    scan_kind: &'static str,
    source: &'a str,
    routes: &'a [ScannedRoute],
}

pub fn run(framework: FrameworkArg, root: String, prefix: Option<String>, output: Option<String>) {
    let framework = match framework {
        FrameworkArg::Nextjs => Framework::NextJs,
        FrameworkArg::Express => Framework::Express,
    };
    let source = framework.source(&root, prefix.as_deref());
    let routes = source.routes().unwrap_or_else(|err| fail(err));
    let payload = ScanPayload {
        schema: SCAN_SCHEMA,
        scan_kind: SCAN_KIND,
        source: source.name(),
        routes: &routes,
    };
    let rendered = serde_json::to_string_pretty(&payload)
        .unwrap_or_else(|error| fail(format!("failed to render scan payload: {error}")));

    match output {
        Some(path) => {
            std::fs::write(&path, format!("{rendered}\n"))
                .unwrap_or_else(|err| fail(format!("failed to write {path}: {err}")));
            eprintln!("wrote {} routes to {path}", routes.len());
        }
        None => println!("{rendered}"),
    }
}
