//! Barrel/Module Emitter: base-path token, Angular module and `index.ts`.
use super::{OutputFile, referenced_types, slug};
use crate::ir::FunctionDescriptor;
use crate::resolve::TypeTable;

pub const TOKEN_FILE: &str = "baseurl.token.ts";
pub const MODULE_FILE: &str = "api.module.ts";
pub const INDEX_FILE: &str = "index.ts";

const TOKEN: &str = "\
import { InjectionToken } from '@angular/core';

export const BASE_URL = new InjectionToken<string>('BASE_URL');
";

const MODULE: &str = "\
import { HttpClientModule } from '@angular/common/http';
import { NgModule } from '@angular/core';

import { ApiService } from './api.service';

@NgModule({
    imports: [HttpClientModule],
    providers: [
        ApiService,
    ]
})
export class ApiModule {
}
";

const INDEX_HEADER: &str = "\
export { ApiModule } from './api.module';
export { ApiService } from './api.service';
export { BASE_URL } from './baseurl.token';
";

pub fn emit_token() -> OutputFile {
    OutputFile::new(TOKEN_FILE, TOKEN)
}

pub fn emit_module() -> OutputFile {
    OutputFile::new(MODULE_FILE, MODULE)
}

pub fn emit_index(functions: &[FunctionDescriptor], types: &TypeTable) -> OutputFile {
    let mut out = String::from(INDEX_HEADER);
    for name in referenced_types(functions, types) {
        out.push_str(&format!("export {{ {name} }} from './{}';\n", slug(name)));
    }
    OutputFile::new(INDEX_FILE, out)
}
