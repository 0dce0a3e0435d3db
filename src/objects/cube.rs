use crate::material::Material;
use crate::objects::aabb::AABB;
use crate::objects::hit::{HitRecord, Hitable};
use crate::objects::rectangle::AxisRectangle;
use crate::objects::transform::FlipNormals;
use crate::{Ray, Vec3};
use std::sync::Arc;

/// Closed axis-aligned box made of six rectangles with outward normals.
pub struct Cube {
    pub box_min: Vec3,
    pub box_max: Vec3,
    pub sides: Vec<Arc<dyn Hitable>>,
}

impl Cube {
    pub fn new(box_min: Vec3, box_max: Vec3, mat: Arc<dyn Material>) -> Self {
        let (p0, p1) = (box_min, box_max);
        let flipped =
            |side: AxisRectangle| -> Arc<dyn Hitable> { Arc::new(FlipNormals::new(Arc::new(side))) };
        let sides: Vec<Arc<dyn Hitable>> = vec![
            Arc::new(AxisRectangle::xy(
                (p0.x, p0.y),
                (p1.x, p1.y),
                p1.z,
                Arc::clone(&mat),
            )),
            flipped(AxisRectangle::xy(
                (p0.x, p0.y),
                (p1.x, p1.y),
                p0.z,
                Arc::clone(&mat),
            )),
            Arc::new(AxisRectangle::xz(
                (p0.x, p0.z),
                (p1.x, p1.z),
                p1.y,
                Arc::clone(&mat),
            )),
            flipped(AxisRectangle::xz(
                (p0.x, p0.z),
                (p1.x, p1.z),
                p0.y,
                Arc::clone(&mat),
            )),
            Arc::new(AxisRectangle::yz(
                (p0.y, p0.z),
                (p1.y, p1.z),
                p1.x,
                Arc::clone(&mat),
            )),
            flipped(AxisRectangle::yz(
                (p0.y, p0.z),
                (p1.y, p1.z),
                p0.x,
                Arc::clone(&mat),
            )),
        ];
        Self {
            box_min,
            box_max,
            sides,
        }
    }
}

impl Hitable for Cube {
    fn hit(&self, r: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        self.sides.hit(r, t_min, t_max)
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> AABB {
        AABB::new(self.box_min, self.box_max)
    }
}
