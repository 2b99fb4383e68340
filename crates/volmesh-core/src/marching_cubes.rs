//! Marching cubes isosurface extraction.
//!
//! Walks every cell of 8 neighbouring samples, classifies the corners against the
//! isovalue, looks the configuration up in a 256-entry triangle table and emits
//! triangles whose vertices are interpolated along the crossing edges. Vertices
//! are shared between neighbouring cells through a two-layer slab cache, so a
//! closed isosurface comes out as a closed indexed mesh.
//!
//! The triangle table follows the public-domain `MarchingCubeCpp` layout.

#![allow(
    clippy::unreadable_literal,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

use glam::Vec3;

use crate::grid::{Dims, ScalarField};
use crate::mesh::TriangleMesh;

/// Corner `i` sits at offset `(i & 1, (i >> 1) & 1, (i >> 2) & 1)` from the cell origin.
const CORNER_OFFSETS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// A cell edge: its two corners, the axis it runs along and the offset of its
/// lower endpoint from the cell origin.
struct CellEdge {
    corners: (usize, usize),
    axis: usize,
    offset: [usize; 3],
}

/// Edges 0-3 run along x, 4-7 along y, 8-11 along z.
const CELL_EDGES: [CellEdge; 12] = [
    CellEdge { corners: (0, 1), axis: 0, offset: [0, 0, 0] },
    CellEdge { corners: (2, 3), axis: 0, offset: [0, 1, 0] },
    CellEdge { corners: (4, 5), axis: 0, offset: [0, 0, 1] },
    CellEdge { corners: (6, 7), axis: 0, offset: [0, 1, 1] },
    CellEdge { corners: (0, 2), axis: 1, offset: [0, 0, 0] },
    CellEdge { corners: (1, 3), axis: 1, offset: [1, 0, 0] },
    CellEdge { corners: (4, 6), axis: 1, offset: [0, 0, 1] },
    CellEdge { corners: (5, 7), axis: 1, offset: [1, 0, 1] },
    CellEdge { corners: (0, 4), axis: 2, offset: [0, 0, 0] },
    CellEdge { corners: (1, 5), axis: 2, offset: [1, 0, 0] },
    CellEdge { corners: (2, 6), axis: 2, offset: [0, 1, 0] },
    CellEdge { corners: (3, 7), axis: 2, offset: [1, 1, 0] },
];

impl CellEdge {
    /// A cell computes an edge only if no earlier cell (lower y or z, or lower x)
    /// shares it; every other edge is read back from the slab.
    #[inline]
    fn owned_by(&self, cell: [usize; 3]) -> bool {
        (0..3)
            .filter(|&d| d != self.axis)
            .all(|d| self.offset[d] == 1 || cell[d] == 0)
    }
}

/// Extracts the isosurface `field == isovalue` as a triangle mesh.
///
/// A corner counts as below the surface when `sample < isovalue`. Vertices are
/// returned in physical coordinates (grid index scaled by the field's spacing);
/// normals are area-weighted averages of the adjacent face normals.
///
/// Grids with fewer than two samples along any axis, fields that never cross the
/// isovalue, and non-finite isovalues all produce an empty mesh.
#[must_use]
pub fn extract<F: ScalarField + ?Sized>(field: &F, isovalue: f32) -> TriangleMesh {
    let dims = field.dims();
    if dims.nx < 2 || dims.ny < 2 || dims.nz < 2 || !isovalue.is_finite() {
        return TriangleMesh::default();
    }

    let mut builder = MeshBuilder::new(dims, field.spacing());
    let mut vs = [0.0_f32; 8];
    let mut edge_indices = [0_u32; 12];

    for z in 0..dims.nz - 1 {
        for y in 0..dims.ny - 1 {
            for x in 0..dims.nx - 1 {
                for (v, offset) in vs.iter_mut().zip(&CORNER_OFFSETS) {
                    let index = dims.index(x + offset[0], y + offset[1], z + offset[2]);
                    *v = field.sample(index) - isovalue;
                }

                let config = vs
                    .iter()
                    .enumerate()
                    .fold(0_usize, |acc, (i, &v)| acc | (usize::from(v < 0.0) << i));

                // Fully inside or fully outside
                if config == 0 || config == 255 {
                    continue;
                }

                let cell = [x, y, z];
                for edge in &CELL_EDGES {
                    if edge.owned_by(cell) {
                        builder.compute_edge(edge, &vs, cell);
                    }
                }
                for (slot, edge) in edge_indices.iter_mut().zip(&CELL_EDGES) {
                    *slot = builder.edge_vertex(edge, cell);
                }

                builder.emit_triangles(MC_TRIS[config], &edge_indices);
            }
        }
    }

    builder.finish()
}

/// Accumulates vertices and triangles while sweeping the grid.
struct MeshBuilder {
    dims: Dims,
    spacing: Vec3,
    /// Vertex index per edge axis for two z-layers of lattice points.
    slab: Vec<[u32; 3]>,
    mesh: TriangleMesh,
}

impl MeshBuilder {
    fn new(dims: Dims, spacing: Vec3) -> Self {
        Self {
            dims,
            spacing,
            slab: vec![[0; 3]; dims.nx * dims.ny * 2],
            mesh: TriangleMesh::default(),
        }
    }

    /// Slab slot of lattice point `(x, y, z)`; layers alternate on `z % 2`.
    #[inline]
    fn slab_index(&self, p: [usize; 3]) -> usize {
        self.dims.nx * self.dims.ny * (p[2] % 2) + p[1] * self.dims.nx + p[0]
    }

    #[inline]
    fn edge_origin(edge: &CellEdge, cell: [usize; 3]) -> [usize; 3] {
        [
            cell[0] + edge.offset[0],
            cell[1] + edge.offset[1],
            cell[2] + edge.offset[2],
        ]
    }

    /// Creates the crossing vertex on `edge` if its endpoints straddle the surface.
    fn compute_edge(&mut self, edge: &CellEdge, vs: &[f32; 8], cell: [usize; 3]) {
        let va = vs[edge.corners.0];
        let vb = vs[edge.corners.1];
        if (va < 0.0) == (vb < 0.0) {
            return;
        }
        let origin = Self::edge_origin(edge, cell);
        let mut p = Vec3::new(origin[0] as f32, origin[1] as f32, origin[2] as f32);
        p[edge.axis] += va / (va - vb);

        let idx = self.mesh.vertices.len() as u32;
        let slot = self.slab_index(origin);
        self.slab[slot][edge.axis] = idx;
        self.mesh.vertices.push(p * self.spacing);
        self.mesh.normals.push(Vec3::ZERO);
    }

    #[inline]
    fn edge_vertex(&self, edge: &CellEdge, cell: [usize; 3]) -> u32 {
        self.slab[self.slab_index(Self::edge_origin(edge, cell))][edge.axis]
    }

    /// Decodes one table entry: bits `[3:0]` hold the triangle count, then 4 bits
    /// per triangle corner give the cell edge it sits on.
    fn emit_triangles(&mut self, config: u64, edge_indices: &[u32; 12]) {
        let n_triangles = (config & 0xF) as usize;
        let mut shift = 4;
        for _ in 0..n_triangles {
            let mut tri = [0_u32; 3];
            for corner in &mut tri {
                *corner = edge_indices[((config >> shift) & 0xF) as usize];
                shift += 4;
            }
            self.accumulate_normal(tri);
            self.mesh.triangles.push(tri);
        }
    }

    /// Adds the (area-weighted) face normal of `tri` to its three vertices.
    fn accumulate_normal(&mut self, [a, b, c]: [u32; 3]) {
        let va = self.mesh.vertices[a as usize];
        let vb = self.mesh.vertices[b as usize];
        let vc = self.mesh.vertices[c as usize];
        let n = (vc - vb).cross(va - vb);
        for i in [a, b, c] {
            self.mesh.normals[i as usize] += n;
        }
    }

    fn finish(mut self) -> TriangleMesh {
        for normal in &mut self.mesh.normals {
            let len = normal.length();
            if len > 1e-10 {
                *normal /= len;
            }
        }
        self.mesh
    }
}

/// Look-up table for triangle configurations (256 entries, one per cube configuration).
///
/// Each entry is a `u64` encoding:
/// - Bits `[3:0]`: Number of triangles (0-5)
/// - Bits `[7:4]`, `[11:8]`, ...: Edge indices (0-11) for each triangle vertex, 4 bits each
#[rustfmt::skip]
static MC_TRIS: [u64; 256] = [
    0, 33793, 36945, 159668546,
    18961, 144771090, 5851666, 595283255635,
    20913, 67640146, 193993474, 655980856339,
    88782242, 736732689667, 797430812739, 194554754,
    26657, 104867330, 136709522, 298069416227,
    109224258, 8877909667, 318136408323, 1567994331701604,
    189884450, 350847647843, 559958167731, 3256298596865604,
    447393122899, 651646838401572, 2538311371089956, 737032694307,
    29329, 43484162, 91358498, 374810899075,
    158485010, 178117478419, 88675058979, 433581536604804,
    158486962, 649105605635, 4866906995, 3220959471609924,
    649165714851, 3184943915608436, 570691368417972, 595804498035,
    124295042, 431498018963, 508238522371, 91518530,
    318240155763, 291789778348404, 1830001131721892, 375363605923,
    777781811075, 1136111028516116, 3097834205243396, 508001629971,
    2663607373704004, 680242583802939237, 333380770766129845, 179746658,
    42545, 138437538, 93365810, 713842853011,
    73602098, 69575510115, 23964357683, 868078761575828,
    28681778, 713778574611, 250912709379, 2323825233181284,
    302080811955, 3184439127991172, 1694042660682596, 796909779811,
    176306722, 150327278147, 619854856867, 1005252473234484,
    211025400963, 36712706, 360743481544788, 150627258963,
    117482600995, 1024968212107700, 2535169275963444, 4734473194086550421,
    628107696687956, 9399128243, 5198438490361643573, 194220594,
    104474994, 566996932387, 427920028243, 2014821863433780,
    492093858627, 147361150235284, 2005882975110676, 9671606099636618005,
    777701008947, 3185463219618820, 482784926917540, 2900953068249785909,
    1754182023747364, 4274848857537943333, 13198752741767688709, 2015093490989156,
    591272318771, 2659758091419812, 1531044293118596, 298306479155,
    408509245114388, 210504348563, 9248164405801223541, 91321106,
    2660352816454484, 680170263324308757, 8333659837799955077, 482966828984116,
    4274926723105633605, 3184439197724820, 192104450, 15217,
    45937, 129205250, 129208402, 529245952323,
    169097138, 770695537027, 382310500883, 2838550742137652,
    122763026, 277045793139, 81608128403, 1991870397907988,
    362778151475, 2059003085103236, 2132572377842852, 655681091891,
    58419234, 239280858627, 529092143139, 1568257451898804,
    447235128115, 679678845236084, 2167161349491220, 1554184567314086709,
    165479003923, 1428768988226596, 977710670185060, 10550024711307499077,
    1305410032576132, 11779770265620358997, 333446212255967269, 978168444447012,
    162736434, 35596216627, 138295313843, 891861543990356,
    692616541075, 3151866750863876, 100103641866564, 6572336607016932133,
    215036012883, 726936420696196, 52433666, 82160664963,
    2588613720361524, 5802089162353039525, 214799000387, 144876322,
    668013605731, 110616894681956, 1601657732871812, 430945547955,
    3156382366321172, 7644494644932993285, 3928124806469601813, 3155990846772900,
    339991010498708, 10743689387941597493, 5103845475, 105070898,
    3928064910068824213, 156265010, 1305138421793636, 27185,
    195459938, 567044449971, 382447549283, 2175279159592324,
    443529919251, 195059004769796, 2165424908404116, 1554158691063110021,
    504228368803, 1436350466655236, 27584723588724, 1900945754488837749,
    122971970, 443829749251, 302601798803, 108558722,
    724700725875, 43570095105972, 2295263717447940, 2860446751369014181,
    2165106202149444, 69275726195, 2860543885641537797, 2165106320445780,
    2280890014640004, 11820349930268368933, 8721082628082003989, 127050770,
    503707084675, 122834978, 2538193642857604, 10129,
    801441490467, 2923200302876740, 1443359556281892, 2901063790822564949,
    2728339631923524, 7103874718248233397, 12775311047932294245, 95520290,
    2623783208098404, 1900908618382410757, 137742672547, 2323440239468964,
    362478212387, 727199575803140, 73425410, 34337,
    163101314, 668566030659, 801204361987, 73030562,
    591509145619, 162574594, 100608342969108, 5553,
    724147968595, 1436604830452292, 176259090, 42001,
    143955266, 2385, 18433, 0,
];
