//! Output generators for decoded types

use crate::types::{Kind, TypeInfo};
use serde::Serialize;
use std::path::Path;
use typemeta_core::Result;

/// JSON report of decoded types
#[derive(Debug, Serialize)]
pub struct TypeReport<'a> {
    pub types: &'a [TypeInfo],
    pub total_types: usize,
    pub total_properties: usize,
}

impl<'a> TypeReport<'a> {
    pub fn new(types: &'a [TypeInfo]) -> Self {
        Self {
            types,
            total_types: types.len(),
            total_properties: types.iter().map(|t| t.number_of_properties).sum(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| typemeta_core::Error::parse(e.to_string()))
    }

    /// Write to JSON file
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Plain-text layout listing, one block per type
pub struct LayoutListing;

impl LayoutListing {
    pub fn generate(types: &[TypeInfo]) -> String {
        let mut output = String::new();
        for info in types {
            output.push_str(&Self::generate_type(info));
            output.push('\n');
        }
        output
    }

    fn generate_type(info: &TypeInfo) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} // {} size=0x{:X} align={} stride=0x{:X}\n",
            Self::keyword(info.kind),
            info.name,
            info.mangled_name,
            info.size,
            info.alignment,
            info.stride
        ));

        if !info.generic_types.is_empty() {
            let generics = info
                .generic_types
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!("    <{}>\n", generics));
        }

        for property in &info.properties {
            output.push_str(&format!(
                "    0x{:04X}  {}: {}\n",
                property.byte_offset, property.name, property.ty
            ));
        }

        output
    }

    fn keyword(kind: Kind) -> &'static str {
        match kind {
            Kind::Struct => "struct",
            Kind::Class => "class",
            Kind::Enum | Kind::Optional => "enum",
            _ => "type",
        }
    }

    /// Write listing to file
    pub fn write_to_file(types: &[TypeInfo], path: &Path) -> Result<()> {
        std::fs::write(path, Self::generate(types))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PropertyInfo;
    use typemeta_core::TypeReference;

    fn point() -> TypeInfo {
        let owner = TypeReference::new(0x4000);
        TypeInfo {
            kind: Kind::Struct,
            name: "Point".into(),
            ty: owner,
            mangled_name: "4main5PointV".into(),
            properties: vec![
                PropertyInfo {
                    name: "x".into(),
                    ty: TypeReference::new(0x10),
                    byte_offset: 0,
                    owner_type: owner,
                },
                PropertyInfo {
                    name: "y".into(),
                    ty: TypeReference::new(0x10),
                    byte_offset: 8,
                    owner_type: owner,
                },
            ],
            generic_types: Vec::new(),
            number_of_properties: 2,
            number_of_generic_types: 0,
            size: 16,
            alignment: 8,
            stride: 16,
        }
    }

    #[test]
    fn test_listing() {
        let listing = LayoutListing::generate(&[point()]);
        assert!(listing
            .starts_with("struct Point // 4main5PointV size=0x10 align=8 stride=0x10\n"));
        assert!(listing.contains("    0x0008  y: 0x10\n"));
    }

    #[test]
    fn test_json_report() {
        let types = [point()];
        let json = TypeReport::new(&types).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_properties"], 2);
        assert_eq!(value["types"][0]["properties"][1]["name"], "y");
        assert_eq!(value["types"][0]["kind"], "Struct");
    }
}
