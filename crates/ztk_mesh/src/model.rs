use ztk_io::Buffer;

use crate::{ModelHierarchy, ModelMesh, Result};

/// A combined model (`.MDL`): a hierarchy followed by a model mesh in
/// one buffer.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub hierarchy: ModelHierarchy,
    pub mesh: ModelMesh,
}

impl Model {
    pub fn parse(buf: &mut Buffer) -> Result<Model> {
        let hierarchy = ModelHierarchy::parse(buf)?;
        let mesh = ModelMesh::parse(buf)?;
        Ok(Model { hierarchy, mesh })
    }
}
