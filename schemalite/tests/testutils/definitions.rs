//! Schema definitions used across integration tests

use schemalite::{PropertyDeclaration, SchemaDefinition};

/// `File { name: String }`
pub fn file() -> SchemaDefinition {
    SchemaDefinition::node("File").with_property(PropertyDeclaration::new("name", "String"))
}

/// `File { name: String (indexed), size: Long }`
pub fn indexed_file() -> SchemaDefinition {
    SchemaDefinition::node("File")
        .with_property(PropertyDeclaration::new("name", "String").indexed())
        .with_property(PropertyDeclaration::new("size", "Long"))
        .with_view("public", &["name"])
}

/// `SubFile extends File { tag: String }`
pub fn sub_file() -> SchemaDefinition {
    SchemaDefinition::node("SubFile")
        .extending("File")
        .with_property(PropertyDeclaration::new("tag", "String"))
}

pub fn folder() -> SchemaDefinition {
    SchemaDefinition::node("Folder")
        .with_property(PropertyDeclaration::new("path", "String").indexed())
        .with_property(PropertyDeclaration::new("files", "Ref(File)[]"))
}

pub fn folder_contains_file() -> SchemaDefinition {
    SchemaDefinition::relationship("FolderContainsFile", "Folder", "CONTAINS", "File")
}
