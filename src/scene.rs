use crate::camera::Camera;
use crate::integrator::Background;
use crate::material::{Dielectric, DiffuseLight, Lambertian, Material, Metal};
use crate::objects::bvh::BVHNode;
use crate::objects::cube::Cube;
use crate::objects::hit::Hitable;
use crate::objects::medium::ConstantMedium;
use crate::objects::rectangle::AxisRectangle;
use crate::objects::sphere::{MovingSphere, Sphere};
use crate::objects::transform::{FlipNormals, RotateY, Translate};
use crate::objects::SceneError;
use crate::texture::{CheckerTexture, ConstantTexture, NoiseTexture};
use crate::Vec3;
use rand::{Rng, RngCore};
use std::sync::Arc;

/// Everything a render needs, frozen before the workers start.
pub struct Scene {
    pub world: Arc<dyn Hitable>,
    /// Shapes sampled for next-event estimation. `None` samples only
    /// material lobes.
    pub lights: Option<Arc<dyn Hitable>>,
    pub camera: Camera,
    pub background: Background,
}

pub const SCENE_NAMES: [&str; 4] = [
    "cornell box",
    "cornell smoke",
    "two perlin spheres",
    "bouncing spheres",
];

pub fn select_scene(
    index: usize,
    aspect_ratio: f64,
    rng: &mut dyn RngCore,
) -> Result<Scene, SceneError> {
    match index {
        0 => cornell_box(aspect_ratio, rng),
        1 => cornell_smoke(aspect_ratio, rng),
        2 => two_perlin_spheres(aspect_ratio, rng),
        3 => bouncing_spheres(aspect_ratio, rng),
        _ => Err(SceneError::UnknownScene(index)),
    }
}

fn lambertian(color: Vec3) -> Arc<dyn Material> {
    Arc::new(Lambertian::new(ConstantTexture(color)))
}

fn cornell_camera(aspect_ratio: f64) -> Camera {
    Camera::new(
        (Vec3::new(278., 278., -800.), Vec3::new(278., 278., 0.)),
        Vec3::new(0., 1., 0.),
        40.,
        aspect_ratio,
        0.0,
        10.0,
        (0.0, 1.0),
    )
}

/// The five walls, facing inward.
fn cornell_walls() -> Vec<Arc<dyn Hitable>> {
    let red = lambertian(Vec3::new(0.65, 0.05, 0.05));
    let white = lambertian(Vec3::splat(0.73));
    let green = lambertian(Vec3::new(0.12, 0.45, 0.15));
    vec![
        Arc::new(FlipNormals::new(Arc::new(AxisRectangle::yz(
            (0., 0.),
            (555., 555.),
            555.,
            green,
        )))),
        Arc::new(AxisRectangle::yz((0., 0.), (555., 555.), 0., red)),
        Arc::new(FlipNormals::new(Arc::new(AxisRectangle::xz(
            (0., 0.),
            (555., 555.),
            555.,
            Arc::clone(&white),
        )))),
        Arc::new(AxisRectangle::xz(
            (0., 0.),
            (555., 555.),
            0.,
            Arc::clone(&white),
        )),
        Arc::new(FlipNormals::new(Arc::new(AxisRectangle::xy(
            (0., 0.),
            (555., 555.),
            555.,
            white,
        )))),
    ]
}

fn rotated_box(size: Vec3, degrees: f64, offset: Vec3, mat: Arc<dyn Material>) -> Arc<dyn Hitable> {
    Arc::new(Translate::new(
        Arc::new(RotateY::new(Arc::new(Cube::new(Vec3::zero(), size, mat)), degrees)),
        offset,
    ))
}

pub fn cornell_box(aspect_ratio: f64, rng: &mut dyn RngCore) -> Result<Scene, SceneError> {
    let light_mat: Arc<dyn Material> = Arc::new(DiffuseLight::new(ConstantTexture(Vec3::splat(15.))));
    let light: Arc<dyn Hitable> = Arc::new(FlipNormals::new(Arc::new(AxisRectangle::xz(
        (213., 227.),
        (343., 332.),
        554.,
        light_mat,
    ))));
    let glass_sphere: Arc<dyn Hitable> = Arc::new(Sphere::new(
        Vec3::new(190., 90., 190.),
        90.,
        Arc::new(Dielectric::new(1.5)),
    ));

    let mut objects = cornell_walls();
    objects.push(Arc::clone(&light));
    objects.push(Arc::clone(&glass_sphere));
    objects.push(rotated_box(
        Vec3::new(165., 330., 165.),
        15.,
        Vec3::new(265., 0., 295.),
        Arc::new(Metal::new(ConstantTexture(Vec3::new(0.8, 0.85, 0.88)), 0.)),
    ));

    let lights: Arc<dyn Hitable> = Arc::new(vec![light, glass_sphere]);
    Ok(Scene {
        world: Arc::new(BVHNode::new(objects, 0., 1., rng)?),
        lights: Some(lights),
        camera: cornell_camera(aspect_ratio),
        background: Background::default(),
    })
}

pub fn cornell_smoke(aspect_ratio: f64, rng: &mut dyn RngCore) -> Result<Scene, SceneError> {
    let light_mat: Arc<dyn Material> = Arc::new(DiffuseLight::new(ConstantTexture(Vec3::splat(7.))));
    let light: Arc<dyn Hitable> = Arc::new(FlipNormals::new(Arc::new(AxisRectangle::xz(
        (113., 127.),
        (443., 432.),
        554.,
        light_mat,
    ))));
    let white = lambertian(Vec3::splat(0.73));
    let tall = rotated_box(
        Vec3::new(165., 330., 165.),
        15.,
        Vec3::new(265., 0., 295.),
        Arc::clone(&white),
    );
    let short = rotated_box(Vec3::splat(165.), -18., Vec3::new(130., 0., 65.), white);

    let mut objects = cornell_walls();
    objects.push(Arc::clone(&light));
    objects.push(Arc::new(ConstantMedium::new(
        tall,
        0.01,
        ConstantTexture(Vec3::zero()),
    )?));
    objects.push(Arc::new(ConstantMedium::new(
        short,
        0.01,
        ConstantTexture(Vec3::ones()),
    )?));

    Ok(Scene {
        world: Arc::new(BVHNode::new(objects, 0., 1., rng)?),
        lights: Some(light),
        camera: cornell_camera(aspect_ratio),
        background: Background::default(),
    })
}

fn outdoor_camera(aspect_ratio: f64, aperture: f64) -> Camera {
    Camera::new(
        (Vec3::new(13., 2., 3.), Vec3::zero()),
        Vec3::new(0., 1., 0.),
        20.,
        aspect_ratio,
        aperture,
        10.,
        (0.0, 1.0),
    )
}

pub fn two_perlin_spheres(aspect_ratio: f64, rng: &mut dyn RngCore) -> Result<Scene, SceneError> {
    let marble: Arc<dyn Material> = Arc::new(Lambertian::new(NoiseTexture::new(4.)));
    let objects: Vec<Arc<dyn Hitable>> = vec![
        Arc::new(Sphere::new(
            Vec3::new(0., -1000., 0.),
            1000.,
            Arc::clone(&marble),
        )),
        Arc::new(Sphere::new(Vec3::new(0., 2., 0.), 2., marble)),
    ];
    Ok(Scene {
        world: Arc::new(BVHNode::new(objects, 0., 1., rng)?),
        lights: None,
        camera: outdoor_camera(aspect_ratio, 0.0),
        background: Background::Sky,
    })
}

/// Checkered ground under a field of small spheres; the diffuse ones
/// bounce upward while the shutter is open.
pub fn bouncing_spheres(aspect_ratio: f64, rng: &mut dyn RngCore) -> Result<Scene, SceneError> {
    let checker = CheckerTexture::new(
        ConstantTexture(Vec3::new(0.2, 0.3, 0.1)),
        ConstantTexture(Vec3::splat(0.9)),
    );
    let mut objects: Vec<Arc<dyn Hitable>> = vec![Arc::new(Sphere::new(
        Vec3::new(0., -1000., 0.),
        1000.,
        Arc::new(Lambertian::new(checker)),
    ))];

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = rng.gen::<f64>();
            let center = Vec3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );
            if (center - Vec3::new(4., 0.2, 0.)).length() <= 0.9 {
                continue;
            }
            if choose_mat < 0.8 {
                let albedo = Vec3::elemul(Vec3::random(rng), Vec3::random(rng));
                let center1 = center + Vec3::new(0., 0.5 * rng.gen::<f64>(), 0.);
                objects.push(Arc::new(MovingSphere::new(
                    (center, center1),
                    (0., 1.),
                    0.2,
                    lambertian(albedo),
                )?));
            } else if choose_mat < 0.95 {
                let albedo = Vec3::random_in_range(rng, 0.5, 1.);
                let fuzz = 0.5 * rng.gen::<f64>();
                objects.push(Arc::new(Sphere::new(
                    center,
                    0.2,
                    Arc::new(Metal::new(ConstantTexture(albedo), fuzz)),
                )));
            } else {
                objects.push(Arc::new(Sphere::new(
                    center,
                    0.2,
                    Arc::new(Dielectric::new(1.5)),
                )));
            }
        }
    }

    objects.push(Arc::new(Sphere::new(
        Vec3::new(0., 1., 0.),
        1.,
        Arc::new(Dielectric::new(1.5)),
    )));
    objects.push(Arc::new(Sphere::new(
        Vec3::new(-4., 1., 0.),
        1.,
        lambertian(Vec3::new(0.4, 0.2, 0.1)),
    )));
    objects.push(Arc::new(Sphere::new(
        Vec3::new(4., 1., 0.),
        1.,
        Arc::new(Metal::new(ConstantTexture(Vec3::new(0.7, 0.6, 0.5)), 0.)),
    )));

    Ok(Scene {
        world: Arc::new(BVHNode::new(objects, 0., 1., rng)?),
        lights: None,
        camera: outdoor_camera(aspect_ratio, 0.1),
        background: Background::Sky,
    })
}
