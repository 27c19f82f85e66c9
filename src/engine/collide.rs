//! Collision primitives, the budgeted contact buffer, and narrow-phase tests.
//!
//! Contacts reference bodies by index into the slice later handed to
//! [`super::resolve::ContactResolver`].  The contact normal always points
//! from `other` towards `body` (for plane contacts: out of the plane).

use super::body::RigidBody;
use bevy::math::Vec3;

/// An oriented box collider.  The rigid body is owned by the box.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionBox {
    pub half_size: Vec3,
    pub body: RigidBody,
}

impl CollisionBox {
    pub fn new(half_size: Vec3) -> Self {
        Self {
            half_size,
            body: RigidBody::default(),
        }
    }

    /// World-space direction of local axis `index` (0 = X, 1 = Y, 2 = Z).
    #[inline]
    pub fn axis(&self, index: usize) -> Vec3 {
        self.body.transform_direction(Vec3::AXES[index])
    }

    #[inline]
    pub fn centre(&self) -> Vec3 {
        self.body.position
    }

    /// Half the box's extent projected onto `axis`.
    fn project_onto(&self, axis: Vec3) -> f32 {
        self.half_size.x * axis.dot(self.axis(0)).abs()
            + self.half_size.y * axis.dot(self.axis(1)).abs()
            + self.half_size.z * axis.dot(self.axis(2)).abs()
    }
}

/// An infinite static half-space `direction · p <= offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPlane {
    pub direction: Vec3,
    pub offset: f32,
}

impl CollisionPlane {
    pub const FLOOR: Self = Self {
        direction: Vec3::Y,
        offset: 0.0,
    };
}

/// One contact awaiting resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub body: usize,
    /// `None` for contacts against static geometry.
    pub other: Option<usize>,
    pub point: Vec3,
    pub normal: Vec3,
    pub penetration: f32,
    pub friction: f32,
    pub restitution: f32,
}

/// Contact buffer with a hard per-frame budget.
///
/// The buffer never holds more contacts than the budget passed to
/// [`CollisionData::new`] or [`CollisionData::reset`];
/// [`CollisionData::add_contact`] drops contacts once it is spent.
#[derive(Debug, Clone, Default)]
pub struct CollisionData {
    contacts: Vec<Contact>,
    capacity: usize,
    pub friction: f32,
    pub restitution: f32,
    /// Collision tolerance stored with the budget.  The narrow-phase tests
    /// only report touching or overlapping shapes and do not read it.
    pub tolerance: f32,
}

impl CollisionData {
    pub fn new(capacity: usize) -> Self {
        Self {
            contacts: Vec::with_capacity(capacity),
            capacity,
            ..Default::default()
        }
    }

    /// Empty the buffer and set a fresh budget.
    pub fn reset(&mut self, capacity: usize) {
        self.contacts.clear();
        self.capacity = capacity;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    #[inline]
    pub fn has_more_contacts(&self) -> bool {
        self.contacts.len() < self.capacity
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Append a contact carrying the buffer's friction and restitution.
    /// Returns `false` (and drops it) when the budget is exhausted.
    pub fn add_contact(
        &mut self,
        body: usize,
        other: Option<usize>,
        point: Vec3,
        normal: Vec3,
        penetration: f32,
    ) -> bool {
        if !self.has_more_contacts() {
            return false;
        }
        self.contacts.push(Contact {
            body,
            other,
            point,
            normal,
            penetration,
            friction: self.friction,
            restitution: self.restitution,
        });
        true
    }
}

const VERTEX_SIGNS: [Vec3; 8] = [
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(1.0, 1.0, -1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(1.0, -1.0, -1.0),
    Vec3::new(-1.0, -1.0, -1.0),
];

/// Box against a static half-space: one contact per penetrating vertex.
/// Returns the number of contacts written.
pub fn box_and_half_space(
    shape: &CollisionBox,
    id: usize,
    plane: &CollisionPlane,
    data: &mut CollisionData,
) -> usize {
    if !data.has_more_contacts() {
        return 0;
    }

    let projected_radius = shape.project_onto(plane.direction);
    let box_distance = plane.direction.dot(shape.centre()) - projected_radius;
    if box_distance > plane.offset {
        return 0;
    }

    let mut written = 0;
    for signs in VERTEX_SIGNS {
        let vertex = shape.body.point_to_world(shape.half_size * signs);
        let distance = vertex.dot(plane.direction);
        if distance <= plane.offset {
            let point = vertex + plane.direction * (plane.offset - distance);
            if !data.add_contact(id, None, point, plane.direction, plane.offset - distance) {
                break;
            }
            written += 1;
        }
    }
    written
}

fn penetration_on_axis(one: &CollisionBox, two: &CollisionBox, axis: Vec3, to_centre: Vec3) -> f32 {
    let distance = to_centre.dot(axis).abs();
    one.project_onto(axis) + two.project_onto(axis) - distance
}

/// Separating-axis test.  `None` means a separating axis was found.
fn try_axis(
    one: &CollisionBox,
    two: &CollisionBox,
    axis: Vec3,
    to_centre: Vec3,
    index: usize,
    smallest: &mut (f32, usize),
) -> Option<()> {
    // Near-parallel edge pairs produce no usable axis.
    if axis.length_squared() < 1.0e-4 {
        return Some(());
    }
    let axis = axis.normalize();
    let penetration = penetration_on_axis(one, two, axis, to_centre);
    if penetration < 0.0 {
        return None;
    }
    if penetration < smallest.0 {
        *smallest = (penetration, index);
    }
    Some(())
}

/// Contact for a vertex of `two` resting on face `axis_index` of `one`.
#[allow(clippy::too_many_arguments)]
fn fill_point_face(
    one: &CollisionBox,
    one_id: usize,
    two: &CollisionBox,
    two_id: usize,
    to_centre: Vec3,
    axis_index: usize,
    penetration: f32,
    data: &mut CollisionData,
) -> bool {
    let mut normal = one.axis(axis_index);
    if normal.dot(to_centre) > 0.0 {
        normal = -normal;
    }

    let mut vertex = two.half_size;
    for i in 0..3 {
        if two.axis(i).dot(normal) < 0.0 {
            vertex[i] = -vertex[i];
        }
    }

    data.add_contact(one_id, Some(two_id), two.body.point_to_world(vertex), normal, penetration)
}

/// Closest point between two edges, falling back to one edge's midpoint when
/// the edges are parallel or the closest points lie outside either edge.
fn edge_contact_point(
    p_one: Vec3,
    d_one: Vec3,
    one_size: f32,
    p_two: Vec3,
    d_two: Vec3,
    two_size: f32,
    use_one: bool,
) -> Vec3 {
    let fallback = if use_one { p_one } else { p_two };

    let sm_one = d_one.length_squared();
    let sm_two = d_two.length_squared();
    let dp_one_two = d_two.dot(d_one);

    let to_st = p_one - p_two;
    let dp_sta_one = d_one.dot(to_st);
    let dp_sta_two = d_two.dot(to_st);

    let denom = sm_one * sm_two - dp_one_two * dp_one_two;
    if denom.abs() < 1.0e-4 {
        return fallback;
    }

    let mua = (dp_one_two * dp_sta_two - sm_two * dp_sta_one) / denom;
    let mub = (sm_one * dp_sta_two - dp_one_two * dp_sta_one) / denom;

    if mua.abs() > one_size || mub.abs() > two_size {
        return fallback;
    }
    let c_one = p_one + d_one * mua;
    let c_two = p_two + d_two * mub;
    (c_one + c_two) * 0.5
}

/// Oriented box against oriented box using the 15 separating axes.
/// Writes at most one contact; returns the number written.
pub fn box_and_box(
    one: &CollisionBox,
    one_id: usize,
    two: &CollisionBox,
    two_id: usize,
    data: &mut CollisionData,
) -> usize {
    if !data.has_more_contacts() {
        return 0;
    }

    let to_centre = two.centre() - one.centre();
    let mut smallest = (f32::MAX, usize::MAX);

    for i in 0..3 {
        if try_axis(one, two, one.axis(i), to_centre, i, &mut smallest).is_none() {
            return 0;
        }
    }
    for i in 0..3 {
        if try_axis(one, two, two.axis(i), to_centre, 3 + i, &mut smallest).is_none() {
            return 0;
        }
    }
    let best_single_axis = smallest.1;

    for i in 0..3 {
        for j in 0..3 {
            let axis = one.axis(i).cross(two.axis(j));
            if try_axis(one, two, axis, to_centre, 6 + i * 3 + j, &mut smallest).is_none() {
                return 0;
            }
        }
    }

    let (penetration, best) = smallest;
    if best == usize::MAX {
        return 0;
    }

    let written = if best < 3 {
        fill_point_face(one, one_id, two, two_id, to_centre, best, penetration, data)
    } else if best < 6 {
        // Vertex of `one` on a face of `two`: the contact is reported from
        // `two`'s side, so `two` becomes the primary body.
        fill_point_face(two, two_id, one, one_id, -to_centre, best - 3, penetration, data)
    } else {
        let edge = best - 6;
        let one_axis_index = edge / 3;
        let two_axis_index = edge % 3;
        let one_axis = one.axis(one_axis_index);
        let two_axis = two.axis(two_axis_index);

        let mut axis = one_axis.cross(two_axis).normalize();
        if axis.dot(to_centre) > 0.0 {
            axis = -axis;
        }

        // Midpoints of the two touching edges, in each box's local space.
        let mut pt_on_one_edge = one.half_size;
        let mut pt_on_two_edge = two.half_size;
        for i in 0..3 {
            if i == one_axis_index {
                pt_on_one_edge[i] = 0.0;
            } else if one.axis(i).dot(axis) > 0.0 {
                pt_on_one_edge[i] = -pt_on_one_edge[i];
            }

            if i == two_axis_index {
                pt_on_two_edge[i] = 0.0;
            } else if two.axis(i).dot(axis) < 0.0 {
                pt_on_two_edge[i] = -pt_on_two_edge[i];
            }
        }

        let vertex = edge_contact_point(
            one.body.point_to_world(pt_on_one_edge),
            one_axis,
            one.half_size[one_axis_index],
            two.body.point_to_world(pt_on_two_edge),
            two_axis,
            two.half_size[two_axis_index],
            best_single_axis > 2,
        );

        data.add_contact(one_id, Some(two_id), vertex, axis, penetration)
    };

    usize::from(written)
}
