#![allow(dead_code)]

use std::fmt;

use story_ngin::{
    analysis::StoryAnalysis,
    data_structures::{descriptor::Color, instance::Instance, model::MeshData},
    surface::{Frame, RenderSurface},
};

/// One call the code under test made on a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SurfaceEvent {
    Clear,
    CreateGeometry { id: usize, label: String },
    CreateMaterial { id: usize, label: String, color: Color },
    ReleaseGeometry(usize),
    ReleaseMaterial(usize),
    Draw { geometries: Vec<usize>, materials: Vec<usize> },
}

/// Stand-in for a GPU buffer. Deliberately not `Clone`: it can only be
/// released by handing the value itself back.
#[derive(Debug, PartialEq)]
pub(crate) struct FakeGeometry {
    pub(crate) id: usize,
    pub(crate) label: String,
    pub(crate) num_elements: u32,
    pub(crate) position: [f32; 3],
}

#[derive(Debug, PartialEq)]
pub(crate) struct FakeMaterial {
    pub(crate) id: usize,
    pub(crate) color: Color,
}

#[derive(Debug)]
pub(crate) struct FakeDrawError;

impl fmt::Display for FakeDrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("surface lost")
    }
}

impl std::error::Error for FakeDrawError {}

/// Render surface that records every call instead of touching a GPU.
pub(crate) struct RecordingSurface {
    pub(crate) dimensions: Option<(u32, u32)>,
    pub(crate) events: Vec<SurfaceEvent>,
    pub(crate) fail_draws: bool,
    next_id: usize,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            dimensions: Some((width, height)),
            events: Vec::new(),
            fail_draws: false,
            next_id: 0,
        }
    }

    /// A surface whose host element is gone.
    pub fn detached() -> Self {
        Self {
            dimensions: None,
            ..Self::new(0, 0)
        }
    }

    fn next_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    pub fn created_geometries(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::CreateGeometry { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn created_materials(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::CreateMaterial { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn released_geometries(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::ReleaseGeometry(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn released_materials(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::ReleaseMaterial(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn draws(&self) -> Vec<(Vec<usize>, Vec<usize>)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Draw {
                    geometries,
                    materials,
                } => Some((geometries.clone(), materials.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn position_of(&self, event: &SurfaceEvent) -> Option<usize> {
        self.events.iter().position(|e| e == event)
    }

    pub fn forget_events(&mut self) {
        self.events.clear();
    }
}

impl RenderSurface for RecordingSurface {
    type Geometry = FakeGeometry;
    type Material = FakeMaterial;
    type Error = FakeDrawError;

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    fn clear(&mut self) {
        self.events.push(SurfaceEvent::Clear);
    }

    fn create_geometry(
        &mut self,
        label: &str,
        mesh: &MeshData,
        transform: &Instance,
    ) -> Self::Geometry {
        let id = self.next_id();
        self.events.push(SurfaceEvent::CreateGeometry {
            id,
            label: label.to_string(),
        });
        FakeGeometry {
            id,
            label: label.to_string(),
            num_elements: mesh.num_elements(),
            position: transform.position.into(),
        }
    }

    fn create_material(&mut self, label: &str, color: Color) -> Self::Material {
        let id = self.next_id();
        self.events.push(SurfaceEvent::CreateMaterial {
            id,
            label: label.to_string(),
            color,
        });
        FakeMaterial { id, color }
    }

    fn release_geometry(&mut self, geometry: Self::Geometry) {
        self.events.push(SurfaceEvent::ReleaseGeometry(geometry.id));
    }

    fn release_material(&mut self, material: Self::Material) {
        self.events.push(SurfaceEvent::ReleaseMaterial(material.id));
    }

    fn draw(&mut self, frame: &Frame<'_, Self>) -> Result<(), Self::Error> {
        if self.fail_draws {
            return Err(FakeDrawError);
        }
        let geometries = frame.items.iter().map(|item| item.geometry.id).collect();
        let materials = frame
            .items
            .iter()
            .flat_map(|item| item.materials.iter().map(|material| material.id))
            .collect();
        self.events.push(SurfaceEvent::Draw {
            geometries,
            materials,
        });
        Ok(())
    }
}

pub(crate) fn analysis(
    characters: &[&str],
    objects: &[&str],
    setting: &str,
    mood: &str,
) -> StoryAnalysis {
    StoryAnalysis {
        characters: characters.iter().map(|c| c.to_string()).collect(),
        objects: objects.iter().map(|o| o.to_string()).collect(),
        setting: setting.to_string(),
        mood: mood.to_string(),
        ..Default::default()
    }
}

/// The knight and dragon scene used throughout the tests.
pub(crate) fn knight_and_dragon() -> StoryAnalysis {
    analysis(
        &["knight", "dragon"],
        &["sword", "chest"],
        "ancient castle forest",
        "dark stormy",
    )
}
