use std::f32::consts::FRAC_PI_2;

use approx::assert_relative_eq;
use cgmath::Rad;
use story_ngin::{
    compose,
    compose::{BRIGHT_AMBIENT, DARK_AMBIENT, Palette, SceneComposer},
    data_structures::descriptor::{Color, Geometry, LightKind, NodeKind},
};

use crate::common::test_utils::{analysis, knight_and_dragon};
mod common;

fn ambient(mood: &str) -> f32 {
    compose(&analysis(&[], &[], "", mood))
        .light(LightKind::Ambient)
        .map(|light| light.intensity)
        .expect("ambient light is always present")
}

#[test]
fn characters_are_spaced_along_x() {
    let names = ["a", "b", "c", "d", "e"];
    for n in 0..=names.len() {
        let descriptor = compose(&analysis(&names[..n], &[], "", ""));
        let characters: Vec<_> = descriptor.nodes_of(NodeKind::Character).collect();
        assert_eq!(characters.len(), n);
        for (i, node) in characters.iter().enumerate() {
            let position = node.transform.position;
            assert_relative_eq!(position.x, i as f32 * 2.0 - 2.0);
            assert_relative_eq!(position.y, 0.0);
            assert_relative_eq!(position.z, 0.0);
            assert_eq!(node.label, names[i]);
            assert!(matches!(node.geometry, Geometry::Sphere { radius, .. } if radius == 0.5));
        }
    }
}

#[test]
fn objects_sit_in_front_of_the_characters() {
    let names = ["sword", "chest", "crystal", "map"];
    for m in 0..=names.len() {
        let descriptor = compose(&analysis(&["knight"], &names[..m], "", ""));
        let objects: Vec<_> = descriptor.nodes_of(NodeKind::Object).collect();
        assert_eq!(objects.len(), m);
        for (i, node) in objects.iter().enumerate() {
            let position = node.transform.position;
            assert_relative_eq!(position.x, i as f32 - 1.0);
            assert_relative_eq!(position.y, 0.5);
            assert_relative_eq!(position.z, 1.0);
            assert_eq!(node.geometry, Geometry::Cube { size: 0.5 });
            assert_eq!(node.color, Palette::default().accent);
        }
    }
}

#[test]
fn long_casts_are_not_truncated() {
    let names: Vec<String> = (0..100).map(|i| format!("extra {}", i)).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let descriptor = compose(&analysis(&names, &names, "", ""));
    assert_eq!(descriptor.nodes_of(NodeKind::Character).count(), 100);
    assert_eq!(descriptor.nodes_of(NodeKind::Object).count(), 100);
    assert_eq!(descriptor.nodes.len(), 201);
}

#[test]
fn ground_is_always_rotated_a_quarter_turn() {
    let inputs = [
        analysis(&[], &[], "", ""),
        knight_and_dragon(),
        analysis(&["x"; 7], &["y"; 3], "desert", "calm"),
    ];
    for input in &inputs {
        let descriptor = compose(input);
        assert_eq!(descriptor.nodes_of(NodeKind::Ground).count(), 1);
        let ground = descriptor.ground().expect("ground is always present");
        assert_relative_eq!(ground.transform.rotation.x.0, FRAC_PI_2);
        assert_relative_eq!(ground.transform.rotation.y.0, 0.0);
        assert_relative_eq!(ground.transform.rotation.z.0, 0.0);
        assert_eq!(
            ground.geometry,
            Geometry::Plane {
                width: 20.0,
                height: 20.0
            }
        );
    }
}

#[test]
fn dark_moods_dim_the_ambient_light() {
    assert_relative_eq!(ambient("dark"), DARK_AMBIENT);
    assert_relative_eq!(ambient("dark stormy"), 0.4);
    assert_relative_eq!(ambient("a dark night"), 0.4);
    assert_relative_eq!(ambient("very dark"), 0.4);
    assert_relative_eq!(ambient("darkness falls"), 0.4);

    assert_relative_eq!(ambient(""), BRIGHT_AMBIENT);
    assert_relative_eq!(ambient("cheerful"), 0.8);
    assert_relative_eq!(ambient("d a r k"), 0.8);
}

#[test]
fn mood_keyword_is_case_sensitive() {
    assert_relative_eq!(ambient("Dark and gloomy"), 0.8);
    assert_relative_eq!(ambient("DARK"), 0.8);
}

#[test]
fn forest_settings_get_a_green_ground() {
    let palette = Palette::default();
    let ground_color = |setting: &str| {
        compose(&analysis(&[], &[], setting, ""))
            .ground()
            .map(|ground| ground.color)
            .expect("ground is always present")
    };

    assert_eq!(ground_color("forest"), palette.vegetation);
    assert_eq!(ground_color("ancient castle forest"), palette.vegetation);
    assert_eq!(ground_color("rainforest canopy"), palette.vegetation);
    assert_eq!(ground_color("castle courtyard"), palette.earth);
    assert_eq!(ground_color("Forest"), palette.earth);
    assert_eq!(ground_color(""), palette.earth);
}

#[test]
fn composing_twice_gives_the_same_descriptor() {
    let inputs = [
        knight_and_dragon(),
        analysis(&[], &[], "", ""),
        analysis(&["a", "b", "c"], &["d"], "forest", "dark"),
    ];
    for input in &inputs {
        assert_eq!(compose(input), compose(input));
    }
}

#[test]
fn knight_and_dragon_end_to_end() {
    let palette = Palette::default();
    let descriptor = compose(&knight_and_dragon());

    let characters: Vec<_> = descriptor.nodes_of(NodeKind::Character).collect();
    assert_eq!(characters.len(), 2);
    assert_relative_eq!(characters[0].transform.position.x, -2.0);
    assert_eq!(characters[0].color, palette.protagonist);
    assert_eq!(characters[0].color, Color::from_hex(0x4a90e2));
    assert_relative_eq!(characters[1].transform.position.x, 0.0);
    assert_eq!(characters[1].color, palette.secondary);

    let objects: Vec<_> = descriptor.nodes_of(NodeKind::Object).collect();
    assert_eq!(objects.len(), 2);
    assert_relative_eq!(objects[0].transform.position.x, -1.0);
    assert_relative_eq!(objects[1].transform.position.x, 0.0);
    for object in &objects {
        assert_relative_eq!(object.transform.position.y, 0.5);
        assert_relative_eq!(object.transform.position.z, 1.0);
    }

    let ground = descriptor.ground().expect("ground is always present");
    assert_eq!(ground.transform.rotation.x, Rad(FRAC_PI_2));
    assert_eq!(ground.color, palette.vegetation);

    let ambient = descriptor.light(LightKind::Ambient).expect("ambient light");
    assert_relative_eq!(ambient.intensity, 0.4);
    let directional = descriptor
        .light(LightKind::Directional)
        .expect("directional light");
    assert_relative_eq!(directional.intensity, 1.0);
    let position = directional.position.expect("directional lights are placed");
    assert_relative_eq!(position.x, 10.0);
    assert_relative_eq!(position.y, 10.0);
    assert_relative_eq!(position.z, 5.0);
}

#[test]
fn nodes_are_emitted_characters_then_objects_then_ground() {
    let descriptor = compose(&knight_and_dragon());
    let kinds: Vec<_> = descriptor.nodes.iter().map(|node| node.kind).collect();
    assert_eq!(
        kinds,
        [
            NodeKind::Character,
            NodeKind::Character,
            NodeKind::Object,
            NodeKind::Object,
            NodeKind::Ground
        ]
    );
    let lights: Vec<_> = descriptor.lights.iter().map(|light| light.kind).collect();
    assert_eq!(lights, [LightKind::Ambient, LightKind::Directional]);
}

#[test]
fn empty_analysis_gives_a_bare_ground() {
    let descriptor = compose(&analysis(&[], &[], "", ""));
    assert_eq!(descriptor.nodes_of(NodeKind::Character).count(), 0);
    assert_eq!(descriptor.nodes_of(NodeKind::Object).count(), 0);
    assert_eq!(descriptor.nodes.len(), 1);
    let ground = descriptor.ground().expect("ground is always present");
    assert_eq!(ground.color, Palette::default().earth);
    let ambient = descriptor.light(LightKind::Ambient).expect("ambient light");
    assert_relative_eq!(ambient.intensity, 0.8);
}

#[test]
fn custom_palette_recolors_the_scene() {
    let palette = Palette {
        protagonist: Color::from_hex(0x112233),
        vegetation: Color::from_hex(0x00ff00),
        ..Default::default()
    };
    let descriptor = SceneComposer::new(palette.clone()).compose(&knight_and_dragon());
    let first = descriptor
        .nodes_of(NodeKind::Character)
        .next()
        .expect("knight");
    assert_eq!(first.color, palette.protagonist);
    assert_eq!(
        descriptor.ground().map(|ground| ground.color),
        Some(Color::from_hex(0x00ff00))
    );
}
