/*!
genconstructor scans a directory of Go source files for struct declarations
marked with a `//genconstructor` doc comment and emits one generated file per
package containing a constructor function per marked struct.

```go
//genconstructor
type Foo struct {
    key string `required:"[constValue]"`
}
```

Fields tagged `required` become constructor parameters (or baked-in constant
values when the tag carries an expression); `-p`, `-s`, and `-e` on the
marker line select pointer, super-interface, and extends-interface return
forms.
*/

pub mod assemble;
pub mod cli;
pub mod error;
pub mod fields;
pub mod imports;
pub mod naming;
pub mod options;
pub mod synth;
pub mod walker;

use std::io::Write;
use std::path::Path;

pub use error::{Error, Result};
pub use options::Mode;
pub use walker::PackageGroup;

use assemble::GeneratedUnit;
use imports::ImportTable;

const DEFAULT_GENERATOR_NAME: &str = "go-genconstructor";

/// Run-wide settings, mirroring the generator's functional options.
pub struct Options {
    generator_name: String,
    file_filter: Option<Box<dyn Fn(&str) -> bool>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            generator_name: DEFAULT_GENERATOR_NAME.to_string(),
            file_filter: None,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name embedded in the generated-file header.
    pub fn with_generator_name(mut self, name: impl Into<String>) -> Self {
        self.generator_name = name.into();
        self
    }

    /// Restrict the walk to files whose bare name passes the predicate.
    pub fn with_file_filter(mut self, filter: impl Fn(&str) -> bool + 'static) -> Self {
        self.file_filter = Some(Box::new(filter));
        self
    }
}

/// Scan `target_dir` and hand one assembled file per non-empty package
/// group to a writer obtained from `new_writer`.
///
/// Groups are processed one at a time in walk order; within a group, types
/// in declaration order and fields in field-list order. A writer is only
/// requested for groups that produced at least one constructor, and each
/// writer is flushed and dropped (closed) exactly once, on success or on
/// error. Any unrecoverable error aborts the run; files already written for
/// prior groups stay on disk.
pub fn run<F>(target_dir: &Path, mut new_writer: F, options: &Options) -> Result<()>
where
    F: FnMut(&PackageGroup) -> std::io::Result<Box<dyn Write>>,
{
    let groups = walker::walk(target_dir, options.file_filter.as_deref())?;

    for group in &groups {
        // per-group state, discarded after the writer completes
        let mut import_table = ImportTable::new();
        let mut body = String::new();

        for file in &group.files {
            for decl in &file.types {
                let Some(mode) = options::parse_doc_lines(decl.docs.iter().map(String::as_str))
                else {
                    continue;
                };
                let classified = fields::classify(decl);
                if classified.fields.is_empty() {
                    // a marker without any tagged field generates nothing
                    continue;
                }

                for field in &classified.fields {
                    let pairs = match &field.const_value {
                        Some(value) => imports::const_expr_imports(value, file)?,
                        None => imports::type_imports(&field.printed_type, file)?,
                    };
                    imports::merge(&mut import_table, pairs);
                }

                let interface_name = match mode {
                    Mode::Super => Some(naming::super_interface(&decl.name)),
                    Mode::Extends => Some(naming::extends_interface(
                        classified.base_name.as_deref().unwrap_or_default(),
                        &decl.name,
                    )),
                    Mode::Plain | Mode::Pointer => None,
                };

                let ctor = synth::render(
                    &decl.name,
                    mode,
                    interface_name.as_deref(),
                    &classified.fields,
                )?;
                if !body.is_empty() {
                    body.push('\n');
                }
                body.push_str(&ctor);
            }
        }

        if body.is_empty() {
            continue;
        }

        let text = assemble::assemble(
            &options.generator_name,
            &GeneratedUnit {
                package_name: group.name.clone(),
                imports: import_table,
                body,
            },
        )?;

        let write_err = |source| Error::Write {
            package: group.name.clone(),
            source,
        };
        let mut writer = new_writer(group).map_err(write_err)?;
        writer
            .write_all(text.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(write_err)?;
        // writer dropped here: closed once, whether the write succeeded
    }

    Ok(())
}
