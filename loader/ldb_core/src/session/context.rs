//! State of the class being loaded and of its current instance line.

use ldb_ir::{ClassId, ObjectId, ObjectImage, Ordinal};

use crate::catalog::MethodSignature;
use crate::collection::CollectionBuilder;
use crate::descriptor::DescriptorTable;
use crate::event::AttributeMode;
use crate::store::ClassValueKind;

impl AttributeMode {
    /// Where values go outside instance mode.
    pub(crate) fn class_value_kind(self) -> Option<ClassValueKind> {
        match self {
            AttributeMode::Instance => None,
            AttributeMode::Class => Some(ClassValueKind::Class),
            AttributeMode::Shared => Some(ClassValueKind::Shared),
            AttributeMode::Default => Some(ClassValueKind::Default),
        }
    }
}

/// The partition key of a partitioned class and where it was listed.
#[derive(Clone, Debug)]
pub(super) struct PartitionKey {
    pub attribute: String,
    pub index: Option<usize>,
}

/// One `%class` block.
#[derive(Debug)]
pub(super) struct ClassContext {
    pub class: ClassId,
    pub name: String,
    pub mode: AttributeMode,
    /// Listed attribute and argument names; their count is the number of
    /// values a line must carry.
    pub names: Vec<String>,
    /// Empty in validation-only mode.
    pub descriptors: DescriptorTable,
    pub constructor: Option<MethodSignature>,
    /// Attributes listed before the constructor arguments.
    pub arg_index: usize,
    pub partition: Option<PartitionKey>,
    /// Cleared by an error that makes the rest of the block meaningless.
    pub valid: bool,
    pub instance: Option<InstanceBuilder>,
    pub inst_total: u64,
    pub errors: u64,
    pub status_counter: u32,
}

impl ClassContext {
    pub fn new(class: ClassId, name: String, partition: Option<PartitionKey>) -> Self {
        ClassContext {
            class,
            name,
            mode: AttributeMode::Instance,
            names: Vec::new(),
            descriptors: DescriptorTable::new(),
            constructor: None,
            arg_index: 0,
            partition,
            valid: true,
            instance: None,
            inst_total: 0,
            errors: 0,
            status_counter: 0,
        }
    }

    /// Values expected on each line.
    pub fn value_count(&self) -> usize {
        self.names.len()
    }

    /// Lines build instances from scratch rather than through a constructor.
    pub fn builds_images(&self) -> bool {
        self.mode == AttributeMode::Instance && self.constructor.is_none()
    }
}

/// One instance line being assembled.
#[derive(Debug)]
pub(super) struct InstanceBuilder {
    pub ordinal: Option<Ordinal>,
    pub object: Option<ObjectId>,
    /// `object` is a placeholder created by an earlier forward reference.
    pub reserved: bool,
    pub cursor: usize,
    pub errors: u32,
    pub collection: Option<CollectionBuilder>,
    pub image: ObjectImage,
}

impl InstanceBuilder {
    pub fn new(ordinal: Option<Ordinal>) -> Self {
        InstanceBuilder {
            ordinal,
            object: None,
            reserved: false,
            cursor: 0,
            errors: 0,
            collection: None,
            image: ObjectImage::default(),
        }
    }
}
