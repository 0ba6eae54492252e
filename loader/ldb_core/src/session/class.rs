//! Class blocks: `%id`, `%class`, attribute lists and constructors.

use ldb_diagnostic::{Diagnostic, ErrorCode, LoadError, LoadErrorKind};

use super::context::{ClassContext, PartitionKey};
use super::{LoadStop, LoaderSession};
use crate::catalog::{class_display, AttributeNamespace, SchemaCatalog};
use crate::config::IgnoredClassPolicy;
use crate::descriptor::AttributeDescriptor;
use crate::event::{AttributeMode, ClassRef};
use crate::report::{ClassReport, ReportSink};
use crate::store::ObjectStore;

impl<C, S, R> LoaderSession<C, S, R>
where
    C: SchemaCatalog,
    S: ObjectStore,
    R: ReportSink,
{
    /// `%id name id`: make `id` stand for class `name`.
    pub fn class_id(&mut self, line: u32, name: &str, id: u32) -> Result<(), LoadStop> {
        self.guard(line, |s| {
            match s.catalog.find_class_by_name(name) {
                Some(class) => {
                    s.class_ids.insert(id, class);
                }
                None if s.config.is_ignored(name) => {
                    s.ignored_ids.insert(id);
                }
                None => {
                    return Err(LoadErrorKind::UnknownClass {
                        name: name.to_owned(),
                    }
                    .into());
                }
            }
            Ok(())
        })
    }

    /// `%class`: finish the previous class and start loading `class`.
    pub fn start_class(&mut self, line: u32, class: &ClassRef) -> Result<(), LoadStop> {
        self.guard(line, |s| s.start_class_step(line, class))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(line = line, class = ?class))]
    fn start_class_step(&mut self, line: u32, class: &ClassRef) -> Result<(), LoadStop> {
        self.finish_context(line)?;
        self.skipping = false;

        let resolved = match class {
            ClassRef::Name(name) => {
                if self.config.is_ignored(name) {
                    self.skip_class(line, name);
                    return Ok(());
                }
                self.catalog
                    .find_class_by_name(name)
                    .ok_or_else(|| LoadErrorKind::UnknownClass { name: name.clone() })?
            }
            ClassRef::Id(id) => {
                if self.ignored_ids.contains(id) {
                    self.skip_class(line, &format!("#{id}"));
                    return Ok(());
                }
                self.class_ids
                    .get(id)
                    .copied()
                    .or_else(|| self.catalog.find_class_by_id(*id))
                    .ok_or(LoadErrorKind::UnknownClassId { id: *id })?
            }
        };

        let name = class_display(&self.catalog, resolved);
        if self.config.is_ignored(&name) || self.catalog.is_internal_class(resolved) {
            self.skip_class(line, &name);
            return Ok(());
        }

        let partition = self
            .catalog
            .partition_info(resolved)
            .map(|info| PartitionKey {
                attribute: info.key_attribute,
                index: None,
            });
        tracing::debug!(class = %name, "class started");
        self.context = Some(ClassContext::new(resolved, name, partition));
        Ok(())
    }

    fn skip_class(&mut self, line: u32, name: &str) {
        self.skipping = true;
        tracing::debug!(class = name, "class ignored");
        if self.config.ignored_class_policy == IgnoredClassPolicy::Warn {
            self.emit(
                Diagnostic::warning(ErrorCode::W1001)
                    .with_line(line)
                    .with_message(format!("class {name} is ignored")),
            );
        }
    }

    /// Select where the values of the following lines go.
    pub fn set_attribute_mode(&mut self, line: u32, mode: AttributeMode) -> Result<(), LoadStop> {
        self.guard(line, |s| {
            if let Some(ctx) = active(&mut s.context, s.skipping) {
                ctx.mode = mode;
            }
            Ok(())
        })
    }

    /// List the next attribute of the class block.
    pub fn add_attribute(&mut self, line: u32, name: &str) -> Result<(), LoadStop> {
        self.guard(line, |s| s.add_attribute_step(line, name))
    }

    fn add_attribute_step(&mut self, line: u32, name: &str) -> Result<(), LoadStop> {
        let validation_only = self.validation_only;
        let Some(ctx) = active(&mut self.context, self.skipping) else {
            return Ok(());
        };
        if ctx.constructor.is_some() {
            return self.add_argument_step(line, name);
        }
        if validation_only {
            ctx.names.push(name.to_owned());
            return Ok(());
        }

        let mode = ctx.mode;
        let attribute = self.catalog.get_attribute_descriptor(
            ctx.class,
            name,
            mode == AttributeMode::Class,
        )?;
        let required = match mode {
            AttributeMode::Class => AttributeNamespace::Class,
            AttributeMode::Shared => AttributeNamespace::Shared,
            AttributeMode::Instance | AttributeMode::Default => AttributeNamespace::Instance,
        };
        if attribute.namespace != required {
            return Err(LoadError::from(LoadErrorKind::InvalidClassAttr {
                class: ctx.name.clone(),
                attribute: name.to_owned(),
                namespace: required.as_str(),
            })
            .into());
        }

        let index = ctx
            .descriptors
            .push(AttributeDescriptor::new(name, attribute, false));
        ctx.names.push(name.to_owned());
        if mode == AttributeMode::Instance {
            if let Some(key) = ctx.partition.as_mut() {
                if key.attribute.eq_ignore_ascii_case(name) {
                    key.index = Some(index);
                }
            }
        }
        Ok(())
    }

    /// Name the class method that builds the instances of this block.
    pub fn set_constructor(&mut self, line: u32, name: &str) -> Result<(), LoadStop> {
        self.guard(line, |s| {
            let Some(ctx) = active(&mut s.context, s.skipping) else {
                return Ok(());
            };
            let method = s.catalog.get_constructor_method(ctx.class, name).ok_or_else(|| {
                LoadErrorKind::InvalidConstructor {
                    class: ctx.name.clone(),
                    method: name.to_owned(),
                }
            })?;
            ctx.constructor = Some(method);
            ctx.arg_index = ctx.names.len();
            Ok(())
        })
    }

    /// List the next constructor argument.
    pub fn add_argument(&mut self, line: u32, name: &str) -> Result<(), LoadStop> {
        self.guard(line, |s| s.add_argument_step(line, name))
    }

    fn add_argument_step(&mut self, line: u32, name: &str) -> Result<(), LoadStop> {
        let validation_only = self.validation_only;
        let Some(ctx) = active(&mut self.context, self.skipping) else {
            return Ok(());
        };
        let accepted = match &ctx.constructor {
            None => Err("none".to_owned()),
            Some(method) => {
                let listed = ctx.names.len() - ctx.arg_index;
                if method.arg_count != 0 && listed >= method.arg_count {
                    Err(method.name.clone())
                } else {
                    Ok(())
                }
            }
        };
        if let Err(method) = accepted {
            ctx.valid = false;
            let err: LoadError = LoadErrorKind::UnexpectedArgument { method }.into();
            self.soft(line, Err::<(), _>(err.with_attribute(name)))?;
            return Ok(());
        }

        if !validation_only {
            let attribute = self.catalog.get_attribute_descriptor(ctx.class, name, false)?;
            ctx.descriptors
                .push(AttributeDescriptor::new(name, attribute, true));
        }
        ctx.names.push(name.to_owned());
        Ok(())
    }

    /// Finish the open class block: exchange its OIDs, flush it and report.
    #[tracing::instrument(level = "debug", skip(self))]
    pub(super) fn finish_context(&mut self, line: u32) -> Result<(), LoadStop> {
        self.abandon_instance();
        let Some(ctx) = self.context.take() else {
            return Ok(());
        };

        if !self.validation_only {
            self.resolver.exchange_pending(&mut self.store)?;
            self.store.flush_class(ctx.class)?;
        }
        self.reporter.class_finished(&ClassReport {
            class: ctx.name,
            instances: ctx.inst_total,
            errors: ctx.errors,
        });
        self.check_interrupt(line)
    }
}

/// The class context events apply to, if any.
pub(super) fn active(context: &mut Option<ClassContext>, skipping: bool) -> Option<&mut ClassContext> {
    if skipping {
        return None;
    }
    context.as_mut().filter(|c| c.valid)
}
