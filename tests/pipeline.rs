use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use samgen::error::{Error, ParseError};
use samgen::{RunOptions, run};
use serde_yaml::Value;

const CONFIG: &str = r#"{ "template": "template.yaml", "tsconfig": "tsconfig.json", "output": "client" }"#;

const TEMPLATE: &str = "\
AWSTemplateFormatVersion: '2010-09-09'
Transform: AWS::Serverless-2016-10-31
Resources:
  DataBucket:
    Type: AWS::S3::Bucket
    Properties:
      BucketName: !Sub '${AWS::StackName}-data'
  RetiredFunction:
    Type: AWS::Serverless::Function
    Properties:
      Handler: src/retired.handler
";

const GET_ITEM: &str = r#"
import { ApiHandler, FromPath, LambdaFunction } from 'samgen-runtime';
import { Item } from '../models/item';

@LambdaFunction({
    Properties: {
        Timeout: 10,
        Environment: { Variables: { BUCKET: '!Ref DataBucket' } },
        Events: {
            Get: { Type: 'Api', Properties: { Path: '/items/{id}', Method: 'get' } },
        },
    },
})
export class GetItemFunction extends ApiHandler<Item> {
    public async handle(@FromPath('id') id: number): Promise<Item> {
        const found = await lookup(id);
        return { ...found, id } as Item;
    }
}

export const handler = new GetItemFunction().handler;
"#;

const ITEM: &str = "\
import { Category } from './category';

export interface Item {
    id: number;
    category: Category;
    tags: string[];
}
";

const CATEGORY: &str = "export enum Category { Tools = 'tools', Garden = 'garden' }\n";

fn write(root: &Path, name: &str, contents: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, contents).expect("write fixture");
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "samgen.json", CONFIG);
    write(root, "tsconfig.json", r#"{ "compilerOptions": { "target": "es2021", "strict": true } }"#);
    write(root, "template.yaml", TEMPLATE);
    write(root, "src/functions/get-item.ts", GET_ITEM);
    write(root, "src/models/item.ts", ITEM);
    write(root, "src/models/category.ts", CATEGORY);
    dir
}

fn read(root: &Path, name: &str) -> String {
    fs::read_to_string(root.join(name)).unwrap_or_else(|err| panic!("reading {name}: {err}"))
}

fn template(root: &Path) -> Value {
    serde_yaml::from_str(&read(root, "template.yaml")).expect("template parses")
}

fn output_names(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(root.join("client"))
        .expect("output dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn get_item_end_to_end() {
    let dir = project();
    let root = dir.path();
    let report = run(root, RunOptions::default()).expect("runs");

    assert_eq!(report.functions.len(), 1);
    assert_eq!(report.functions[0].name, "GetItemFunction");
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert_eq!(
        output_names(root),
        ["api.module.ts", "api.service.ts", "baseurl.token.ts", "category.ts", "index.ts", "item.ts"]
    );

    assert_eq!(
        read(root, "client/item.ts"),
        "import { Category } from './category';\n\n\
         export interface Item {\n    id: number;\n    category: Category;\n    tags: string[];\n}\n"
    );
    assert_eq!(
        read(root, "client/category.ts"),
        "\nexport enum Category {\n    Tools = 'tools',\n    Garden = 'garden',\n}\n"
    );

    let service = read(root, "client/api.service.ts");
    assert!(service.contains("import { Item } from './item';\n"), "{service}");
    assert!(!service.contains("Category"), "{service}");
    assert!(
        service.contains(
            "    public getItem(id: number) {\n\
             \x20       const url = `${this.baseUrl}/items/${encodeURIComponent(id)}`;\n"
        ),
        "{service}"
    );
    assert!(service.contains("        return this.http.get<Item>(url, options);\n"), "{service}");

    assert_eq!(
        read(root, "client/index.ts"),
        "export { ApiModule } from './api.module';\n\
         export { ApiService } from './api.service';\n\
         export { BASE_URL } from './baseurl.token';\n\
         export { Item } from './item';\n"
    );

    let doc = template(root);
    let resources = doc["Resources"].as_mapping().expect("resources");
    assert!(resources.get("RetiredFunction").is_none());
    let entry = &doc["Resources"]["GetItemFunction"];
    assert_eq!(entry["Type"], Value::from("AWS::Serverless::Function"));
    assert_eq!(entry["Properties"]["Handler"], Value::from("src/functions/get-item.handler"));
    assert_eq!(entry["Properties"]["Timeout"], Value::from(10));
    assert_eq!(entry["Metadata"]["BuildProperties"]["Target"], Value::from("es2021"));
    assert_eq!(
        entry["Metadata"]["BuildProperties"]["EntryPoints"],
        Value::Sequence(vec![Value::from("src/functions/get-item.ts")])
    );

    let text = read(root, "template.yaml");
    assert!(text.contains("BUCKET: !Ref DataBucket"), "{text}");
    assert!(text.contains("BucketName: !Sub"), "{text}");
}

#[test]
fn second_run_is_identical() {
    let dir = project();
    let root = dir.path();
    run(root, RunOptions::default()).expect("first run");
    let first: Vec<(String, String)> =
        output_names(root).into_iter().map(|n| (n.clone(), read(root, &format!("client/{n}")))).collect();
    let first_template = template(root);

    run(root, RunOptions::default()).expect("second run");
    let second: Vec<(String, String)> =
        output_names(root).into_iter().map(|n| (n.clone(), read(root, &format!("client/{n}")))).collect();
    assert_eq!(first, second);
    assert_eq!(first_template, template(root));
}

#[test]
fn adding_and_removing_handlers_touches_only_their_entries() {
    let dir = project();
    let root = dir.path();
    run(root, RunOptions::default()).expect("first run");
    let before = template(root);

    write(
        root,
        "src/functions/ping.ts",
        "@LambdaFunction({ Properties: { Events: { Ping: { Type: 'Api', Properties: { Path: '/ping', Method: 'get' } } } } })\n\
         class PingFunction extends ApiHandler<string> { handle() { return 'pong'; } }\n\
         export const handler = new PingFunction().handler;\n",
    );
    run(root, RunOptions::default()).expect("second run");
    let after = template(root);

    let keys = |doc: &Value| -> Vec<String> {
        doc["Resources"].as_mapping().expect("map").keys().filter_map(Value::as_str).map(str::to_string).collect()
    };
    assert_eq!(keys(&after), ["DataBucket", "GetItemFunction", "PingFunction"]);
    assert_eq!(after["Resources"]["DataBucket"], before["Resources"]["DataBucket"]);
    assert_eq!(after["Resources"]["GetItemFunction"], before["Resources"]["GetItemFunction"]);
    assert!(read(root, "client/api.service.ts").contains("public ping() {"));

    fs::remove_file(root.join("src/functions/get-item.ts")).expect("remove handler");
    run(root, RunOptions::default()).expect("third run");
    assert_eq!(keys(&template(root)), ["DataBucket", "PingFunction"]);
    assert!(!root.join("client/item.ts").exists());
}

#[test]
fn package_types_are_never_written() {
    let dir = project();
    let root = dir.path();
    write(
        root,
        "src/functions/get-item.ts",
        "import { Item } from '@shared/models';\n\
         @LambdaFunction({ Properties: { Events: { Get: { Type: 'Api', Properties: { Path: '/x', Method: 'get' } } } } })\n\
         class GetItemFunction extends ApiHandler<Item> { handle() {} }\n\
         export const handler = new GetItemFunction().handler;\n",
    );
    let report = run(root, RunOptions::default()).expect("runs");

    assert!(!root.join("client/item.ts").exists());
    let service = read(root, "client/api.service.ts");
    assert!(service.contains("return this.http.get<Item>(url, options);"), "{service}");
    assert!(!service.contains("from './item'"), "{service}");
    assert!(report.diagnostics.iter().any(|d| matches!(
        d,
        samgen::error::Diagnostic::UnresolvedType { name, .. } if name == "Item"
    )));
}

#[test]
fn mutually_recursive_types_across_modules() {
    let dir = project();
    let root = dir.path();
    write(
        root,
        "src/models/item.ts",
        "import { Category } from './category';\nexport interface Item { id: number; parent?: Item; category: Category }\n",
    );
    write(
        root,
        "src/models/category.ts",
        "import { Item } from './item';\nexport interface Category { name: string; featured: Item[] }\n",
    );
    run(root, RunOptions::default()).expect("terminates");

    assert_eq!(
        read(root, "client/item.ts"),
        "import { Category } from './category';\n\n\
         export interface Item {\n    id: number;\n    parent?: Item;\n    category: Category;\n}\n"
    );
    assert_eq!(
        read(root, "client/category.ts"),
        "import { Item } from './item';\n\n\
         export interface Category {\n    name: string;\n    featured: Item[];\n}\n"
    );
}

#[test]
fn stale_typescript_outputs_are_purged() {
    let dir = project();
    let root = dir.path();
    write(root, "client/removed-type.ts", "export interface Gone {}\n");
    write(root, "client/README.md", "kept\n");
    write(root, "client/nested/keep.ts", "export {};\n");

    run(root, RunOptions::default()).expect("runs");
    assert!(!root.join("client/removed-type.ts").exists());
    assert_eq!(read(root, "client/README.md"), "kept\n");
    assert_eq!(read(root, "client/nested/keep.ts"), "export {};\n");
}

#[test]
fn no_op_writes_nothing() {
    let dir = project();
    let root = dir.path();
    let report = run(root, RunOptions { no_op: true }).expect("runs");
    assert!(!report.written);
    assert!(report.files.contains(&"item.ts".to_string()));
    assert!(!root.join("client").exists());
    assert_eq!(read(root, "template.yaml"), TEMPLATE);
}

#[test]
fn syntax_error_aborts_before_any_write() {
    let dir = project();
    let root = dir.path();
    write(root, "client/old.ts", "export {};\n");
    write(root, "src/broken.ts", "class A { handle() { ");

    let err = run(root, RunOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::Syntax { .. })), "{err}");
    assert_eq!(read(root, "client/old.ts"), "export {};\n");
    assert_eq!(read(root, "template.yaml"), TEMPLATE);
}

#[test]
fn missing_configuration_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = run(dir.path(), RunOptions::default()).unwrap_err();
    assert_eq!(err.to_string(), "No \"samgen.json\" file found!");
}
