use glam::Vec3;

use crate::{
    camera::Camera,
    color::{linear::WHITE, Rgb},
    error::Result,
    material::Material,
    math::point::Point,
    scene::SceneBuilder,
};

/// Unit Cornell box, open towards -z, with a square ceiling light and two boxes
pub struct CornellBoxScene;

impl CornellBoxScene {
    pub fn insert_into(builder: &mut SceneBuilder) {
        let lambertian = |r, g, b| Material::Lambertian {
            albedo: Rgb::from_array([r, g, b]),
        };
        let white = builder.insert_material(Some("White".to_owned()), lambertian(0.73, 0.73, 0.73));
        let red = builder.insert_material(Some("Red".to_owned()), lambertian(0.65, 0.05, 0.05));
        let green = builder.insert_material(Some("Green".to_owned()), lambertian(0.12, 0.45, 0.15));

        // Floor, ceiling, back wall
        builder.insert_quad(Point::new(0., 0., 0.), Vec3::Z, Vec3::X, white);
        builder.insert_quad(Point::new(0., 1., 0.), Vec3::X, Vec3::Z, white);
        builder.insert_quad(Point::new(0., 0., 1.), Vec3::Y, Vec3::X, white);
        // Left and right walls
        builder.insert_quad(Point::new(0., 0., 0.), Vec3::Y, Vec3::Z, red);
        builder.insert_quad(Point::new(1., 0., 0.), Vec3::Z, Vec3::Y, green);

        Self::insert_box(builder, Point::new(0.13, 0., 0.40), 0.3, 0.3, white);
        Self::insert_box(builder, Point::new(0.55, 0., 0.55), 0.3, 0.6, white);

        builder.insert_emissive_quad(
            Point::new(0.4, 0.999, 0.4),
            0.2 * Vec3::X,
            0.2 * Vec3::Z,
            WHITE,
            15.0,
        );
    }

    fn insert_box(
        builder: &mut SceneBuilder,
        corner: Point,
        side: f32,
        height: f32,
        material: crate::material::MaterialId,
    ) {
        let x = side * Vec3::X;
        let y = height * Vec3::Y;
        let z = side * Vec3::Z;
        builder.insert_quad(corner, x, y, material);
        builder.insert_quad(corner + z, y, x, material);
        builder.insert_quad(corner, y, z, material);
        builder.insert_quad(corner + x, z, y, material);
        builder.insert_quad(corner + y, z, x, material);
    }

    pub fn camera(width: u32, height: u32) -> Result<Camera> {
        Camera::look_at(
            Point::new(0.5, 0.5, -1.4),
            Point::new(0.5, 0.5, 0.0),
            Vec3::Y,
            40f32.to_radians(),
            width,
            height,
        )
    }
}
