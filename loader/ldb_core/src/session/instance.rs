//! Instance lines: values, collections and the finished instance.

use ldb_convert::{
    check_class_domain, check_object_domain, coerce, convert_element, set_direct, store_value,
    value_for, SetOutcome,
};
use ldb_diagnostic::{LoadError, LoadErrorKind, LoadResult};
use ldb_ir::{ClassId, DomainList, LexicalType, ObjectId, ObjectImage, Ordinal, TypedValue};
use rustc_hash::FxHashMap;

use super::class::active;
use super::context::{ClassContext, InstanceBuilder};
use super::{LoadStop, LoaderSession};
use crate::catalog::{class_display, CatalogHierarchy, SchemaCatalog};
use crate::collection::CollectionBuilder;
use crate::descriptor::{AttributeDescriptor, Buffered};
use crate::event::{AttributeMode, ClassRef, Token};
use crate::report::ReportSink;
use crate::resolve::{InstanceFlags, OidResolver, ReferenceOrigin};
use crate::store::{ClassValueKind, ObjectStore, StoreError};

/// Collaborators a value needs, borrowed apart from the class context.
struct Assembler<'a, C, S> {
    catalog: &'a C,
    store: &'a mut S,
    resolver: &'a mut OidResolver,
    class_ids: &'a FxHashMap<u32, ClassId>,
}

impl<C: SchemaCatalog, S: ObjectStore> Assembler<'_, C, S> {
    fn resolve_class(&self, class: &ClassRef) -> LoadResult<ClassId> {
        match class {
            ClassRef::Name(name) => self.catalog.find_class_by_name(name).ok_or_else(|| {
                LoadErrorKind::UnknownClass {
                    name: name.clone(),
                }
                .into()
            }),
            ClassRef::Id(id) => self
                .class_ids
                .get(id)
                .copied()
                .or_else(|| self.catalog.find_class_by_id(*id))
                .ok_or_else(|| LoadErrorKind::UnknownClassId { id: *id }.into()),
        }
    }

    /// Resolve a reference token stored into `domains`.
    fn reference(
        &mut self,
        token: &Token,
        domains: &DomainList,
        origin: &ReferenceOrigin,
    ) -> LoadResult<TypedValue> {
        let conflict = || LoadError::domain_conflict(token.lexical, domains.primary());
        let target = token.reference.as_ref().ok_or_else(conflict)?;
        let class = target
            .class
            .as_ref()
            .map(|c| self.resolve_class(c))
            .transpose()?;

        match token.lexical {
            LexicalType::ClassOid => {
                let class = class.ok_or_else(conflict)?;
                check_class_domain(domains)?;
                Ok(TypedValue::ClassObject(class))
            }
            LexicalType::Oid => {
                let class = check_object_domain(domains, class, &CatalogHierarchy(self.catalog))?;
                let object = self.resolver.find_instance(
                    self.catalog,
                    &mut *self.store,
                    class,
                    target.ordinal,
                    origin,
                )?;
                if self.resolver.batch_full() {
                    self.resolver.exchange_pending(&mut *self.store)?;
                }
                Ok(TypedValue::Object(object))
            }
            _ => Err(conflict()),
        }
    }

    fn write_class_value(
        &mut self,
        class: ClassId,
        descriptor: &AttributeDescriptor,
        kind: ClassValueKind,
        value: TypedValue,
    ) -> LoadResult<()> {
        let attribute = descriptor.attribute();
        if value.is_null() && attribute.not_null {
            return Err(LoadErrorKind::NullNotAllowed.into());
        }
        self.store
            .set_class_value(class, attribute.handle, kind, value)?;
        Ok(())
    }
}

impl<C, S, R> LoaderSession<C, S, R>
where
    C: SchemaCatalog,
    S: ObjectStore,
    R: ReportSink,
{
    /// Begin an instance line, reusing the placeholder of a forward
    /// reference to `ordinal` if there is one.
    pub fn start_instance(&mut self, line: u32, ordinal: Option<Ordinal>) -> Result<(), LoadStop> {
        self.guard(line, |s| {
            s.abandon_instance();
            let validation_only = s.validation_only;
            let Some(ctx) = active(&mut s.context, s.skipping) else {
                return Ok(());
            };

            let mut instance = InstanceBuilder::new(ordinal);
            if !validation_only && ctx.builds_images() {
                let reserved = ordinal.and_then(|o| s.resolver.reserved(ctx.class, o));
                let object = match reserved {
                    Some(entry) => {
                        instance.reserved = true;
                        if !entry.flags.contains(InstanceFlags::CLASS_ATT_REF) {
                            s.store.release(entry.object);
                        }
                        entry.object
                    }
                    None => {
                        let object = s.store.create_placeholder(ctx.class)?;
                        s.store.release(object);
                        object
                    }
                };
                s.store.set_pinned(object, true);
                instance.object = Some(object);
            }
            ctx.descriptors.clear_buffers();
            ctx.instance = Some(instance);
            Ok(())
        })
    }

    /// One value token: the next attribute, or the next element of the open
    /// collection.
    pub fn value(&mut self, line: u32, token: &Token) -> Result<(), LoadStop> {
        if token.lexical == LexicalType::Collection {
            return self.open_collection(line);
        }
        self.guard(line, |s| {
            let validation_only = s.validation_only;
            let Some(ctx) = active(&mut s.context, s.skipping) else {
                return Ok(());
            };
            let mut asm = Assembler {
                catalog: &s.catalog,
                store: &mut s.store,
                resolver: &mut s.resolver,
                class_ids: &s.class_ids,
            };
            let in_collection = ctx
                .instance
                .as_ref()
                .is_some_and(|i| i.collection.is_some());
            let result = if in_collection {
                collection_element(&mut asm, ctx, token, validation_only)
            } else {
                attribute_value(&mut asm, ctx, token, validation_only)
            };
            let invalidated = !ctx.valid;
            s.soft(line, result)?;
            if invalidated {
                s.abandon_instance();
            }
            Ok(())
        })
    }

    pub fn open_collection(&mut self, line: u32) -> Result<(), LoadStop> {
        self.guard(line, |s| {
            let validation_only = s.validation_only;
            let Some(ctx) = active(&mut s.context, s.skipping) else {
                return Ok(());
            };
            let result = open_builder(ctx, validation_only);
            let invalidated = !ctx.valid;
            s.soft(line, result)?;
            if invalidated {
                s.abandon_instance();
            }
            Ok(())
        })
    }

    pub fn close_collection(&mut self, line: u32) -> Result<(), LoadStop> {
        self.guard(line, |s| {
            let validation_only = s.validation_only;
            let Some(ctx) = active(&mut s.context, s.skipping) else {
                return Ok(());
            };
            let mut asm = Assembler {
                catalog: &s.catalog,
                store: &mut s.store,
                resolver: &mut s.resolver,
                class_ids: &s.class_ids,
            };
            let result = close_builder(&mut asm, ctx, validation_only);
            s.soft(line, result)?;
            Ok(())
        })
    }

    /// End of an instance line: check the value count, insert the instance
    /// and run the commit controller.
    pub fn finish_instance(&mut self, line: u32) -> Result<(), LoadStop> {
        self.guard(line, |s| s.finish_instance_step(line))
    }

    fn finish_instance_step(&mut self, line: u32) -> Result<(), LoadStop> {
        let validation_only = self.validation_only;
        let Some(ctx) = active(&mut self.context, self.skipping) else {
            return Ok(());
        };
        if ctx.instance.is_none() {
            return Ok(());
        }
        let shortfall = line_shortfall(ctx);
        let missing_key = missing_partition_key(ctx, validation_only);
        for err in shortfall.into_iter().chain(missing_key) {
            self.soft(line, Err::<(), _>(err))?;
        }

        let Some(ctx) = self.context.as_mut() else {
            return Ok(());
        };
        let Some(instance) = ctx.instance.take() else {
            return Ok(());
        };
        if instance.errors > 0 {
            discard_object(&mut self.store, &instance);
            self.counters.fail_count += 1;
            return self.check_interrupt(line);
        }
        if ctx.mode != AttributeMode::Instance {
            return self.check_interrupt(line);
        }
        if validation_only {
            self.count_instance();
            return self.check_interrupt(line);
        }

        let class = ctx.class;
        let object = if ctx.constructor.is_some() {
            self.construct_instance(line, instance.ordinal)?
        } else {
            self.write_image(&instance)?
        };
        match object {
            Some(object) => self.record_insert(line, class, instance.ordinal, object),
            None => {
                self.counters.fail_count += 1;
                self.check_interrupt(line)
            }
        }
    }

    fn write_image(&mut self, instance: &InstanceBuilder) -> Result<Option<ObjectId>, LoadStop> {
        let Some(object) = instance.object else {
            return Ok(None);
        };
        self.store.write_instance(object, &instance.image)?;
        self.store.set_pinned(object, false);
        Ok(Some(object))
    }

    /// Call the constructor with the buffered arguments, then apply the
    /// attributes listed before them to the object it returns.
    fn construct_instance(
        &mut self,
        line: u32,
        ordinal: Option<Ordinal>,
    ) -> Result<Option<ObjectId>, LoadStop> {
        let Some(ctx) = self.context.as_mut() else {
            return Ok(None);
        };
        let Some(method) = ctx.constructor.clone() else {
            return Ok(None);
        };
        let class = ctx.class;

        if let Some(ordinal) = ordinal {
            if self.resolver.reserved(class, ordinal).is_some() {
                let err = LoadErrorKind::ForwardConstructor {
                    class: ctx.name.clone(),
                    ordinal,
                };
                self.soft(line, Err::<(), _>(err.into()))?;
                return Ok(None);
            }
        }

        let args = match build_arguments(ctx) {
            Ok(args) => args,
            Err(err) => {
                self.soft(line, Err::<(), _>(err))?;
                return Ok(None);
            }
        };
        let object = self.store.invoke_constructor(class, method.handle, args)?;

        let Some(ctx) = self.context.as_mut() else {
            return Ok(None);
        };
        match apply_attributes(ctx) {
            Ok(image) => {
                self.store.write_instance(object, &image)?;
                self.store.release(object);
                Ok(Some(object))
            }
            Err(err) => {
                self.store.drop_object(object);
                self.soft(line, Err::<(), _>(err))?;
                Ok(None)
            }
        }
    }

    /// Account for an inserted instance and act on the commit controller.
    fn record_insert(
        &mut self,
        line: u32,
        class: ClassId,
        ordinal: Option<Ordinal>,
        object: ObjectId,
    ) -> Result<(), LoadStop> {
        if let Some(ordinal) = ordinal {
            let oid = self
                .store
                .oid_of(object)
                .ok_or_else(|| StoreError::new("insert", "object has no OID"))?;
            self.resolver.record_instance(class, ordinal, object, oid);
            if self.resolver.batch_full() {
                self.resolver.exchange_pending(&mut self.store)?;
            }
        }
        self.resolver.note_insert(class);
        self.note_loaded_class(class);
        self.count_instance();
        let tick = self.commit.record_insert();

        self.check_interrupt(line)?;
        if tick.flush {
            self.resolver.exchange_pending(&mut self.store)?;
            self.store.flush_class(class)?;
        }
        if tick.commit {
            self.periodic_commit(line)?;
        }
        Ok(())
    }

    fn count_instance(&mut self) {
        self.counters.objects_loaded += 1;
        let Some(ctx) = self.context.as_mut() else {
            return;
        };
        ctx.inst_total += 1;
        if self.config.verbose && self.config.status_count > 0 {
            ctx.status_counter += 1;
            if ctx.status_counter >= self.config.status_count {
                ctx.status_counter = 0;
                self.reporter.instances_loaded(&ctx.name, ctx.inst_total);
            }
        }
    }

    /// Drop the open instance line without inserting it.
    pub(super) fn abandon_instance(&mut self) {
        let Some(instance) = self.context.as_mut().and_then(|c| c.instance.take()) else {
            return;
        };
        discard_object(&mut self.store, &instance);
        self.counters.fail_count += 1;
    }
}

fn discard_object<S: ObjectStore>(store: &mut S, instance: &InstanceBuilder) {
    if let Some(object) = instance.object {
        store.set_pinned(object, false);
        if !instance.reserved {
            store.drop_object(object);
        }
    }
}

fn origin_of(ctx: &ClassContext, instance: &InstanceBuilder) -> ReferenceOrigin {
    ReferenceOrigin {
        class: ctx.class,
        ordinal: instance.ordinal,
        object: instance.object,
        class_attribute: ctx.mode != AttributeMode::Instance,
    }
}

/// The next attribute value of the line.
fn attribute_value<C: SchemaCatalog, S: ObjectStore>(
    asm: &mut Assembler<'_, C, S>,
    ctx: &mut ClassContext,
    token: &Token,
    validation_only: bool,
) -> LoadResult<()> {
    let Some(origin) = ctx.instance.as_ref().map(|i| origin_of(ctx, i)) else {
        return Ok(());
    };
    let Some(instance) = ctx.instance.as_mut() else {
        return Ok(());
    };
    let index = instance.cursor;
    instance.cursor += 1;
    if index >= ctx.names.len() {
        ctx.valid = false;
        return Err(LoadErrorKind::ValueOverflow {
            class: ctx.name.clone(),
            expected: ctx.names.len(),
        }
        .into());
    }
    if validation_only {
        if token.lexical.is_temporal() {
            convert_element(&token.text, token.lexical)
                .map_err(|e| e.with_attribute(ctx.names[index].as_str()))?;
        }
        return Ok(());
    }

    let Some(descriptor) = ctx.descriptors.get_mut(index) else {
        return Ok(());
    };
    let result = match ctx.mode.class_value_kind() {
        Some(kind) => class_value(asm, ctx.class, descriptor, token, kind, &origin),
        None if ctx.constructor.is_some() => buffer_value(asm, descriptor, token, &origin),
        None => instance_value(asm, descriptor, token, &mut instance.image, &origin).and_then(|()| {
            let is_key = ctx.partition.as_ref().is_some_and(|k| k.index == Some(index));
            match instance.image.get(descriptor.attribute().slot) {
                Some(key) if is_key => check_partition(asm.catalog, ctx.class, &ctx.name, key),
                _ => Ok(()),
            }
        }),
    };
    result.map_err(|e| e.with_attribute(descriptor.name()))
}

fn instance_value<C: SchemaCatalog, S: ObjectStore>(
    asm: &mut Assembler<'_, C, S>,
    descriptor: &AttributeDescriptor,
    token: &Token,
    image: &mut ObjectImage,
    origin: &ReferenceOrigin,
) -> LoadResult<()> {
    let target = descriptor.target();
    match set_direct(descriptor.setters(), &token.text, token.lexical, &target, image)? {
        SetOutcome::Written => Ok(()),
        SetOutcome::Reference | SetOutcome::ClassReference => {
            let value = asm.reference(token, target.domains, origin)?;
            store_value(image, &target, value)
        }
        SetOutcome::Collection => Err(LoadError::domain_conflict(
            token.lexical,
            target.domains.primary(),
        )),
    }
}

fn class_value<C: SchemaCatalog, S: ObjectStore>(
    asm: &mut Assembler<'_, C, S>,
    class: ClassId,
    descriptor: &AttributeDescriptor,
    token: &Token,
    kind: ClassValueKind,
    origin: &ReferenceOrigin,
) -> LoadResult<()> {
    let domains = &descriptor.attribute().domains;
    let value = if token.lexical.is_reference() {
        asm.reference(token, domains, origin)?
    } else {
        coerce(convert_element(&token.text, token.lexical)?, domains.primary())?
    };
    asm.write_class_value(class, descriptor, kind, value)
}

/// Constructor lines hold their values until the line ends.
fn buffer_value<C: SchemaCatalog, S: ObjectStore>(
    asm: &mut Assembler<'_, C, S>,
    descriptor: &mut AttributeDescriptor,
    token: &Token,
    origin: &ReferenceOrigin,
) -> LoadResult<()> {
    let buffered = if token.lexical.is_reference() {
        Buffered::Value(asm.reference(token, &descriptor.attribute().domains, origin)?)
    } else {
        Buffered::Token {
            lexical: token.lexical,
            text: token.text.clone(),
        }
    };
    descriptor.buffer(buffered);
    Ok(())
}

/// The key value must select the class being loaded or one of its
/// partitions.
fn check_partition<C: SchemaCatalog>(
    catalog: &C,
    class: ClassId,
    name: &str,
    key: &TypedValue,
) -> LoadResult<()> {
    match catalog.select_partition(class, key) {
        Some(partition) if partition == class || catalog.is_subclass_of(partition, class) => Ok(()),
        selected => Err(LoadErrorKind::PartitionMismatch {
            class: name.to_owned(),
            partition: selected.map_or_else(|| "none".to_owned(), |p| class_display(catalog, p)),
        }
        .into()),
    }
}

fn open_builder(ctx: &mut ClassContext, validation_only: bool) -> LoadResult<()> {
    let value_count = ctx.value_count();
    let Some(instance) = ctx.instance.as_mut() else {
        return Ok(());
    };
    if let Some(open) = instance.collection.as_mut() {
        return Err(open.open_nested());
    }
    if instance.cursor >= value_count {
        instance.cursor += 1;
        ctx.valid = false;
        return Err(LoadErrorKind::ValueOverflow {
            class: ctx.name.clone(),
            expected: value_count,
        }
        .into());
    }
    if validation_only {
        instance.collection = Some(CollectionBuilder::discarding());
        return Ok(());
    }

    let Some(descriptor) = ctx.descriptors.get(instance.cursor) else {
        instance.collection = Some(CollectionBuilder::discarding());
        return Ok(());
    };
    if let Some(domain) = descriptor.collection_domain() {
        instance.collection = Some(CollectionBuilder::new(domain.clone()));
        Ok(())
    } else {
        instance.collection = Some(CollectionBuilder::discarding());
        Err(LoadError::domain_conflict(
            LexicalType::Collection,
            descriptor.attribute().domains.primary(),
        )
        .with_attribute(descriptor.name()))
    }
}

fn collection_element<C: SchemaCatalog, S: ObjectStore>(
    asm: &mut Assembler<'_, C, S>,
    ctx: &mut ClassContext,
    token: &Token,
    validation_only: bool,
) -> LoadResult<()> {
    let Some(instance) = ctx.instance.as_ref() else {
        return Ok(());
    };
    let origin = origin_of(ctx, instance);
    let name = ctx.names.get(instance.cursor).cloned().unwrap_or_default();

    let Some(builder) = ctx.instance.as_mut().and_then(|i| i.collection.as_mut()) else {
        return Ok(());
    };
    if builder.is_swallowing() {
        return Ok(());
    }
    let result = if token.lexical.is_reference() {
        if validation_only {
            return Ok(());
        }
        let domains = builder.reference_domains();
        asm.reference(token, &domains, &origin)
            .map(|value| builder.push(value))
    } else {
        builder.push_token(&token.text, token.lexical)
    };
    result.map_err(|e| e.with_attribute(name))
}

fn close_builder<C: SchemaCatalog, S: ObjectStore>(
    asm: &mut Assembler<'_, C, S>,
    ctx: &mut ClassContext,
    validation_only: bool,
) -> LoadResult<()> {
    let Some(instance) = ctx.instance.as_mut() else {
        return Ok(());
    };
    let closed = instance
        .collection
        .as_mut()
        .is_some_and(CollectionBuilder::close);
    if !closed {
        return Ok(());
    }
    let Some(builder) = instance.collection.take() else {
        return Ok(());
    };
    let index = instance.cursor;
    instance.cursor += 1;
    let name = ctx.names.get(index).cloned().unwrap_or_default();

    let Some(value) = builder.finish().map_err(|e| e.with_attribute(name.as_str()))? else {
        return Ok(());
    };
    if validation_only {
        return Ok(());
    }
    let Some(descriptor) = ctx.descriptors.get_mut(index) else {
        return Ok(());
    };
    let result = match ctx.mode.class_value_kind() {
        Some(kind) => asm.write_class_value(ctx.class, descriptor, kind, value),
        None if ctx.constructor.is_some() => {
            descriptor.buffer(Buffered::Value(value));
            Ok(())
        }
        None => store_value(&mut instance.image, &descriptor.target(), value),
    };
    result.map_err(|e| e.with_attribute(name))
}

/// The count error for a line that ended early.
fn line_shortfall(ctx: &ClassContext) -> Option<LoadError> {
    let cursor = ctx.instance.as_ref()?.cursor;
    let expected = ctx.value_count();
    if cursor >= expected {
        return None;
    }
    let kind = if ctx.constructor.is_some() && cursor >= ctx.arg_index {
        LoadErrorKind::MissingArguments {
            expected: expected - ctx.arg_index,
            found: cursor - ctx.arg_index,
        }
    } else {
        LoadErrorKind::MissingAttributes {
            expected: if ctx.constructor.is_some() {
                ctx.arg_index
            } else {
                expected
            },
            found: cursor,
        }
    };
    Some(kind.into())
}

fn missing_partition_key(ctx: &ClassContext, validation_only: bool) -> Option<LoadError> {
    if validation_only || !ctx.builds_images() {
        return None;
    }
    match &ctx.partition {
        Some(key) if key.index.is_none() => Some(
            LoadErrorKind::MissingPartitionKey {
                class: ctx.name.clone(),
                attribute: key.attribute.clone(),
            }
            .into(),
        ),
        _ => None,
    }
}

fn build_arguments(ctx: &mut ClassContext) -> LoadResult<Vec<TypedValue>> {
    let arg_index = ctx.arg_index;
    let mut args = Vec::new();
    for descriptor in ctx.descriptors.iter_mut().skip(arg_index) {
        let value = match descriptor.take_buffered() {
            Some(Buffered::Token { lexical, text }) => convert_element(&text, lexical)
                .map_err(|e| e.with_attribute(descriptor.name()))?,
            Some(Buffered::Value(value)) => value,
            None => TypedValue::Null,
        };
        args.push(value);
    }
    Ok(args)
}

fn apply_attributes(ctx: &mut ClassContext) -> LoadResult<ObjectImage> {
    let arg_index = ctx.arg_index;
    let mut image = ObjectImage::default();
    for descriptor in ctx.descriptors.iter_mut().take(arg_index) {
        let value = match descriptor.take_buffered() {
            Some(Buffered::Token { lexical, text }) => value_for(
                descriptor.setters().op(lexical),
                &text,
                lexical,
                descriptor.attribute().domains.primary(),
            ),
            Some(Buffered::Value(value)) => Ok(value),
            None => continue,
        };
        value
            .and_then(|v| store_value(&mut image, &descriptor.target(), v))
            .map_err(|e| e.with_attribute(descriptor.name()))?;
    }
    Ok(image)
}
