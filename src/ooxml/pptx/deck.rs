/// [`Deck`] over a .pptx package.
use crate::ooxml::error::OoxmlError;
use crate::ooxml::pptx::package::Package;
use crate::ooxml::pptx::parts::SlidePart;
use crate::ooxml::pptx::writer::{write_picture, write_table_frame};
use crate::template::{Deck, Geometry, Grid, Image, Result, ShapeRef, TemplateError};
use std::path::Path;

/// A .pptx package used as a template deck.
pub type PptxDeck = Package;

impl Package {
    /// Slide holding `shape`, checking that the shape exists.
    fn slide_of(&self, shape: ShapeRef) -> Result<&SlidePart> {
        self.slides()
            .get(shape.slide)
            .filter(|part| part.shape(shape.shape_id).is_some())
            .ok_or(TemplateError::ShapeNotFound {
                slide: shape.slide,
                shape_id: shape.shape_id,
            })
    }
}

impl Deck for Package {
    fn slide_count(&self) -> usize {
        Package::slide_count(self)
    }

    fn shapes(&self, slide: usize) -> Result<Vec<ShapeRef>> {
        Ok(self
            .slide(slide)?
            .shapes()
            .iter()
            .map(|s| ShapeRef {
                slide,
                shape_id: s.id(),
            })
            .collect())
    }

    fn shape_text(&self, shape: ShapeRef) -> Result<Option<String>> {
        Ok(self.slide_of(shape)?.shape_text(shape.shape_id)?)
    }

    fn set_shape_text(&mut self, shape: ShapeRef, text: &str) -> Result<()> {
        self.slide_of(shape)?;
        Ok(Package::set_shape_text(self, shape.slide, shape.shape_id, text)?)
    }

    fn geometry(&self, shape: ShapeRef) -> Result<Geometry> {
        self.slide_of(shape)?;
        self.shape_geometry(shape.slide, shape.shape_id)?
            .ok_or_else(|| {
                OoxmlError::InvalidFormat(format!(
                    "shape {} on slide {} has no position",
                    shape.shape_id,
                    shape.slide + 1
                ))
                .into()
            })
    }

    fn add_table(&mut self, slide: usize, geometry: Geometry, grid: &Grid) -> Result<ShapeRef> {
        let shape_id = self.next_shape_id(slide)?;
        let mut xml = String::with_capacity(1024);
        write_table_frame(&mut xml, shape_id, geometry, grid)?;
        self.append_shape(slide, &xml)?;
        Ok(ShapeRef { slide, shape_id })
    }

    fn add_picture(
        &mut self,
        slide: usize,
        geometry: Geometry,
        image: &Image,
    ) -> Result<ShapeRef> {
        let shape_id = self.next_shape_id(slide)?;
        let media = self.add_media(image.data(), image.format());
        let r_id = self.relate_image(slide, &media)?;
        let mut xml = String::with_capacity(512);
        write_picture(&mut xml, shape_id, geometry, &r_id, image.description())?;
        self.append_shape(slide, &xml)?;
        Ok(ShapeRef { slide, shape_id })
    }

    fn remove_shape(&mut self, shape: ShapeRef) -> Result<()> {
        self.slide_of(shape)?;
        Ok(Package::remove_shape(self, shape.slide, shape.shape_id)?)
    }

    fn save(&self, path: &Path) -> Result<()> {
        Ok(Package::save(self, path)?)
    }

    fn source_path(&self) -> Option<&Path> {
        Package::source_path(self)
    }
}
