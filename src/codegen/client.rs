//! Client Service Emitter: one `ApiService` method per HTTP-triggered function.
use std::fmt::Write;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{OutputFile, import_line, referenced_types};
use crate::ir::{FunctionDescriptor, ParamSource};
use crate::resolve::{TypeTable, property_name};

pub const SERVICE_FILE: &str = "api.service.ts";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

const HEADER: &str = "\
import { BASE_URL } from './baseurl.token';
import { HttpClient } from '@angular/common/http';
import { Injectable, Inject, Optional } from '@angular/core';
";

const CLASS_OPEN: &str = "
@Injectable()
export class ApiService {

    constructor(
        @Optional() @Inject(BASE_URL) private readonly baseUrl: string,
        private readonly http: HttpClient,
    ) {
        this.baseUrl = baseUrl || '';
    }

";

pub fn emit_client(functions: &[FunctionDescriptor], types: &TypeTable) -> OutputFile {
    let mut out = String::from(HEADER);
    for name in referenced_types(functions, types) {
        out.push_str(&import_line(name));
    }
    out.push_str(CLASS_OPEN);
    for function in functions {
        if let Some((method, path)) = function.http_route() {
            emit_method(&mut out, function, &method.to_lowercase(), path);
        }
    }
    out.push_str("}\n");
    OutputFile::new(SERVICE_FILE, out)
}

fn emit_method(out: &mut String, function: &FunctionDescriptor, method: &str, path: &str) {
    let params: Vec<String> = function.parameters.iter().map(|p| format!("{}: {}", p.name, p.ty)).collect();
    let url = PLACEHOLDER.replace_all(path, |caps: &Captures| {
        let key = &caps[1];
        let ident = function
            .params_from(ParamSource::Path)
            .find(|p| p.key == key)
            .map_or(key, |p| p.name.as_str());
        format!("${{encodeURIComponent({ident})}}")
    });
    let has_payload = matches!(method, "post" | "put");

    let _ = writeln!(out, "    public {}({}) {{", client_method_name(&function.name), params.join(", "));
    let _ = writeln!(out, "        const url = `${{this.baseUrl}}{url}`;");
    out.push_str("        const options = { headers: {} as any, params: null as any };\n");
    out.push_str("        options.headers['Accept'] = 'application/json';\n");
    if has_payload {
        out.push_str("        options.headers['Content-Type'] = 'application/json';\n");
    }

    let query: Vec<String> = function
        .params_from(ParamSource::Query)
        .map(|p| if p.key == p.name { p.name.clone() } else { format!("{}: {}", property_name(&p.key), p.name) })
        .collect();
    if !query.is_empty() {
        let _ = writeln!(out, "        options.params = {{ {} }};", query.join(", "));
    }

    let args = if has_payload {
        let body = function.body_param().map_or("null", |p| p.name.as_str());
        format!("url, {body}, options")
    } else {
        "url, options".to_string()
    };
    let _ = writeln!(out, "        return this.http.{method}<{}>({args});", function.return_type);
    out.push_str("    }\n\n");
}

/// `GetItemFunction` → `getItem`. A bare `Function` keeps its name.
pub fn client_method_name(function: &str) -> String {
    let stem = match function.strip_suffix("Function") {
        Some(stem) if !stem.is_empty() => stem,
        _ => function,
    };
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ParamBinding;
    use crate::literal::LiteralValue;
    use indexmap::IndexSet;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn param(source: ParamSource, key: &str, name: &str, ty: &str) -> ParamBinding {
        ParamBinding { source, key: key.into(), name: name.into(), ty: ty.into() }
    }

    fn function(name: &str, route: Option<(&str, &str)>, parameters: Vec<ParamBinding>, ret: &str) -> FunctionDescriptor {
        FunctionDescriptor {
            name: name.to_string(),
            source_path: PathBuf::from("/p/fn.ts"),
            handler_export: "handler".to_string(),
            metadata: LiteralValue::Object(Default::default()),
            parameters,
            return_type: ret.to_string(),
            http_method: route.map(|r| r.0.to_string()),
            http_path: route.map(|r| r.1.to_string()),
            references: IndexSet::new(),
        }
    }

    #[test]
    fn method_names() {
        assert_eq!(client_method_name("GetItemFunction"), "getItem");
        assert_eq!(client_method_name("Ping"), "ping");
        assert_eq!(client_method_name("Function"), "function");
    }

    #[test]
    fn renders_service() {
        let functions = vec![
            function(
                "UpdateListFunction",
                Some(("PUT", "/lists/{listId}/items/{other}")),
                vec![
                    param(ParamSource::Path, "listId", "id", "string"),
                    param(ParamSource::Query, "page-size", "pageSize", "number"),
                    param(ParamSource::Query, "tag", "tag", "string"),
                    param(ParamSource::Body, "body", "body", "any"),
                ],
                "void",
            ),
            function("QueueWorkerFunction", None, vec![], "any"),
            function("PingFunction", Some(("get", "/ping")), vec![], "string"),
        ];
        let file = emit_client(&functions, &TypeTable::new());
        assert_eq!(file.name, "api.service.ts");
        assert_eq!(
            file.contents,
            "\
import { BASE_URL } from './baseurl.token';
import { HttpClient } from '@angular/common/http';
import { Injectable, Inject, Optional } from '@angular/core';

@Injectable()
export class ApiService {

    constructor(
        @Optional() @Inject(BASE_URL) private readonly baseUrl: string,
        private readonly http: HttpClient,
    ) {
        this.baseUrl = baseUrl || '';
    }

    public updateList(id: string, pageSize: number, tag: string, body: any) {
        const url = `${this.baseUrl}/lists/${encodeURIComponent(id)}/items/${encodeURIComponent(other)}`;
        const options = { headers: {} as any, params: null as any };
        options.headers['Accept'] = 'application/json';
        options.headers['Content-Type'] = 'application/json';
        options.params = { 'page-size': pageSize, tag };
        return this.http.put<void>(url, body, options);
    }

    public ping() {
        const url = `${this.baseUrl}/ping`;
        const options = { headers: {} as any, params: null as any };
        options.headers['Accept'] = 'application/json';
        return this.http.get<string>(url, options);
    }

}
"
        );
    }

    #[test]
    fn post_without_body_sends_null() {
        let functions = vec![function("CreateFunction", Some(("post", "/things")), vec![], "any")];
        let file = emit_client(&functions, &TypeTable::new());
        assert!(file.contents.contains("return this.http.post<any>(url, null, options);"), "{}", file.contents);
    }
}
