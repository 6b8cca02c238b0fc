mod materials;

pub use materials::{
    MaterialInfo, grade_capacity, lookup_material, material_capacity, normalize_material_name,
};
