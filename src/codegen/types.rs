use indexmap::IndexSet;

use super::{OutputFile, import_line, slug};
use crate::resolve::TypeTable;

/// One `<slug>.ts` per rendered type, in table order. When two names share a
/// slug the first one keeps the file.
pub fn emit_types(types: &TypeTable) -> Vec<OutputFile> {
    let mut taken = IndexSet::new();
    let mut out = Vec::new();

    for def in types.rendered() {
        let name = format!("{}.ts", slug(&def.name));
        if !taken.insert(name.clone()) {
            tracing::warn!(type_name = %def.name, file = %name, "file name already used by another type, skipped");
            continue;
        }
        let imports: String = def
            .references
            .iter()
            .filter(|r| **r != def.name && types.is_rendered(r))
            .map(|r| import_line(r))
            .collect();
        out.push(OutputFile::new(name, format!("{imports}\n{}\n", def.text)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analysis;
    use pretty_assertions::assert_eq;

    #[test]
    fn files_import_only_rendered_neighbours() {
        let mut analysis = Analysis::new();
        let module = analysis
            .modules
            .load_source(
                "/p/models.ts",
                "import { Remote } from 'pkg';\n\
                 export interface OrderLine { order: Order; remote: Remote }\n\
                 export interface Order { lines: OrderLine[]; parent?: Order }\n\
                 type Root = Order;",
            )
            .expect("parses");
        let crate::cache::Declaration::TypeAlias(root) = module.find_declaration("Root").cloned().expect("root") else {
            panic!("expected alias")
        };
        let mut refs = IndexSet::new();
        analysis.resolve_type(&root.ty, &module, &[], &mut refs).expect("resolves");

        let files = emit_types(&analysis.types);
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["order.ts", "order-line.ts"]);
        assert_eq!(
            files[0].contents,
            "import { OrderLine } from './order-line';\n\nexport interface Order {\n    lines: OrderLine[];\n    parent?: Order;\n}\n"
        );
        assert_eq!(
            files[1].contents,
            "import { Order } from './order';\n\nexport interface OrderLine {\n    order: Order;\n    remote: Remote;\n}\n"
        );
    }
}
