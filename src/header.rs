//! Drawing-wide header variables
//!
//! The `AcDb:Header` block is a flat, order-significant run of values.
//! [`HeaderVariables::visit`] describes that order once for R13, R14 and
//! R2000; the section reader and writer drive it through a [`FieldIo`].

use crate::error::Result;
use crate::io::dwg::field_io::FieldIo;
use crate::io::dwg::reference_type::DwgReferenceType;
use crate::tables::DimensionVariables;
use crate::types::{Color, DwgDateTime, DwgTimeSpan, Handle, Vector2, Vector3};

/// DWG header variables containing drawing settings
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderVariables {
    // ==================== Leading constants ====================
    pub unknown_doubles: [f64; 4],
    pub unknown_texts: [String; 4],
    pub unknown_longs: [i32; 2],
    /// R13-R14 only
    pub unknown_short: i16,
    /// Current viewport entity header
    pub current_viewport_entity_header: Handle,

    // ==================== Drawing Mode Flags ====================
    /// DIMASO
    pub associate_dimensions: bool,
    /// DIMSHO
    pub update_dimensions_while_dragging: bool,
    /// DIMSAV (R13-R14)
    pub dim_sav: bool,
    /// PLINEGEN
    pub polyline_linetype_generation: bool,
    /// ORTHOMODE
    pub ortho_mode: bool,
    /// REGENMODE
    pub regen_mode: bool,
    /// FILLMODE
    pub fill_mode: bool,
    /// QTEXTMODE
    pub quick_text_mode: bool,
    /// PSLTSCALE
    pub paper_space_linetype_scaling: bool,
    /// LIMCHECK
    pub limit_check: bool,
    /// BLIPMODE (R13-R14)
    pub blip_mode: bool,
    /// USRTIMER
    pub user_timer: bool,
    /// SKPOLY
    pub sketch_polylines: bool,
    /// ANGDIR
    pub angle_direction_clockwise: bool,
    /// SPLFRAME
    pub spline_frame: bool,
    /// ATTREQ (R13-R14)
    pub attribute_request: bool,
    /// ATTDIA (R13-R14)
    pub attribute_dialog: bool,
    /// MIRRTEXT
    pub mirror_text: bool,
    /// WORLDVIEW
    pub world_view: bool,
    /// WIREFRAME (R13-R14)
    pub wireframe: bool,
    /// TILEMODE
    pub show_model_space: bool,
    /// PLIMCHECK
    pub paper_space_limit_check: bool,
    /// VISRETAIN
    pub retain_xref_visibility: bool,
    /// DELOBJ (R13-R14)
    pub delete_objects: bool,
    /// DISPSILH
    pub display_silhouette: bool,
    /// PELLIPSE
    pub create_ellipse_as_polyline: bool,
    /// PROXYGRAPHICS
    pub proxy_graphics: i16,
    /// DRAGMODE (R13-R14)
    pub drag_mode: i16,

    // ==================== Units and modes ====================
    /// TREEDEPTH
    pub tree_depth: i16,
    /// LUNITS
    pub linear_unit_format: i16,
    /// LUPREC
    pub linear_unit_precision: i16,
    /// AUNITS
    pub angular_unit_format: i16,
    /// AUPREC
    pub angular_unit_precision: i16,
    /// OSMODE (R13-R14)
    pub object_snap_mode: i16,
    /// ATTMODE
    pub attribute_visibility: i16,
    /// COORDS (R13-R14)
    pub coords_mode: i16,
    /// PDMODE
    pub point_display_mode: i16,
    /// PICKSTYLE (R13-R14)
    pub pick_style: i16,
    /// USERI1-5
    pub user_ints: [i16; 5],
    /// SPLINESEGS
    pub spline_segments: i16,
    /// SURFU
    pub surface_u_density: i16,
    /// SURFV
    pub surface_v_density: i16,
    /// SURFTYPE
    pub surface_type: i16,
    /// SURFTAB1
    pub surface_tab1: i16,
    /// SURFTAB2
    pub surface_tab2: i16,
    /// SPLINETYPE
    pub spline_type: i16,
    /// SHADEDGE
    pub shade_edge: i16,
    /// SHADEDIF
    pub shade_diffuse: i16,
    /// UNITMODE
    pub unit_mode: i16,
    /// MAXACTVP
    pub max_active_viewports: i16,
    /// ISOLINES
    pub isolines: i16,
    /// CMLJUST
    pub multiline_justification: i16,
    /// TEXTQLTY
    pub text_quality: i16,

    // ==================== Reals ====================
    /// LTSCALE
    pub linetype_scale: f64,
    /// TEXTSIZE
    pub text_height: f64,
    /// TRACEWID
    pub trace_width: f64,
    /// SKETCHINC
    pub sketch_increment: f64,
    /// FILLETRAD
    pub fillet_radius: f64,
    /// THICKNESS
    pub thickness: f64,
    /// ANGBASE
    pub angle_base: f64,
    /// PDSIZE
    pub point_display_size: f64,
    /// PLINEWID
    pub polyline_width: f64,
    /// USERR1-5
    pub user_reals: [f64; 5],
    /// CHAMFERA
    pub chamfer_distance_a: f64,
    /// CHAMFERB
    pub chamfer_distance_b: f64,
    /// CHAMFERC
    pub chamfer_length: f64,
    /// CHAMFERD
    pub chamfer_angle: f64,
    /// FACETRES
    pub facet_resolution: f64,
    /// CMLSCALE
    pub multiline_scale: f64,
    /// CELTSCALE
    pub current_entity_linetype_scale: f64,
    /// MENUNAME
    pub menu_name: String,

    // ==================== Dates ====================
    /// TDCREATE
    pub create_date: DwgDateTime,
    /// TDUPDATE
    pub update_date: DwgDateTime,
    /// TDINDWG
    pub total_editing_time: DwgTimeSpan,
    /// TDUSRTIMER
    pub user_elapsed_time: DwgTimeSpan,
    /// CECOLOR
    pub current_entity_color: Color,

    /// HANDSEED: next handle to assign
    pub handle_seed: Handle,
    /// CLAYER
    pub current_layer: Handle,
    /// TEXTSTYLE
    pub current_text_style: Handle,
    /// CELTYPE
    pub current_line_type: Handle,
    /// DIMSTYLE
    pub current_dim_style: Handle,
    /// CMLSTYLE
    pub current_multiline_style: Handle,
    /// PSVPSCALE (R2000)
    pub viewport_scale_factor: f64,

    // ==================== Paper space ====================
    /// INSBASE (paper space)
    pub paper_space_insertion_base: Vector3,
    /// EXTMIN (paper space)
    pub paper_space_extents_min: Vector3,
    /// EXTMAX (paper space)
    pub paper_space_extents_max: Vector3,
    /// LIMMIN (paper space)
    pub paper_space_limits_min: Vector2,
    /// LIMMAX (paper space)
    pub paper_space_limits_max: Vector2,
    /// ELEVATION (paper space)
    pub paper_elevation: f64,
    pub paper_space_ucs_origin: Vector3,
    pub paper_space_ucs_x_axis: Vector3,
    pub paper_space_ucs_y_axis: Vector3,
    /// UCSNAME (paper space)
    pub paper_space_ucs: Handle,
    /// PUCSORTHOREF (R2000)
    pub paper_ucs_ortho_ref: Handle,
    /// PUCSORTHOVIEW (R2000)
    pub paper_ucs_ortho_view: i16,
    /// PUCSBASE (R2000)
    pub paper_ucs_base: Handle,
    /// PUCSORGTOP, BOTTOM, LEFT, RIGHT, FRONT, BACK (R2000)
    pub paper_ucs_ortho_origins: [Vector3; 6],

    // ==================== Model space ====================
    /// INSBASE
    pub model_space_insertion_base: Vector3,
    /// EXTMIN
    pub model_space_extents_min: Vector3,
    /// EXTMAX
    pub model_space_extents_max: Vector3,
    /// LIMMIN
    pub model_space_limits_min: Vector2,
    /// LIMMAX
    pub model_space_limits_max: Vector2,
    /// ELEVATION
    pub elevation: f64,
    pub model_space_ucs_origin: Vector3,
    pub model_space_ucs_x_axis: Vector3,
    pub model_space_ucs_y_axis: Vector3,
    /// UCSNAME
    pub model_space_ucs: Handle,
    /// UCSORTHOREF (R2000)
    pub ucs_ortho_ref: Handle,
    /// UCSORTHOVIEW (R2000)
    pub ucs_ortho_view: i16,
    /// UCSBASE (R2000)
    pub ucs_base: Handle,
    /// UCSORGTOP, BOTTOM, LEFT, RIGHT, FRONT, BACK (R2000)
    pub model_ucs_ortho_origins: [Vector3; 6],

    // ==================== Dimension variables ====================
    pub dimension: DimensionVariables,
    /// DIMTXSTY
    pub dim_text_style: Handle,
    /// DIMLDRBLK (R2000)
    pub dim_leader_block: Handle,
    /// DIMBLK (R2000)
    pub dim_arrow_block_handle: Handle,
    /// DIMBLK1 (R2000)
    pub dim_arrow_block1_handle: Handle,
    /// DIMBLK2 (R2000)
    pub dim_arrow_block2_handle: Handle,

    // ==================== Table controls ====================
    pub block_control: Handle,
    pub layer_control: Handle,
    pub style_control: Handle,
    pub line_type_control: Handle,
    pub view_control: Handle,
    pub ucs_control: Handle,
    pub vport_control: Handle,
    pub app_id_control: Handle,
    pub dim_style_control: Handle,
    pub viewport_entity_header_control: Handle,

    /// ACAD_GROUP dictionary
    pub group_dictionary: Handle,
    /// ACAD_MLINESTYLE dictionary
    pub multiline_style_dictionary: Handle,
    /// Named objects dictionary
    pub named_objects_dictionary: Handle,

    // ==================== R2000 ====================
    /// TSTACKALIGN
    pub stacked_text_alignment: i16,
    /// TSTACKSIZE
    pub stacked_text_size_percentage: i16,
    /// HYPERLINKBASE
    pub hyperlink_base: String,
    /// STYLESHEET
    pub stylesheet: String,
    /// ACAD_LAYOUT dictionary
    pub layouts_dictionary: Handle,
    /// ACAD_PLOTSETTINGS dictionary
    pub plot_settings_dictionary: Handle,
    /// ACAD_PLOTSTYLENAME dictionary
    pub plot_styles_dictionary: Handle,
    /// CELWEIGHT, ENDCAPS, JOINSTYLE, LWDISPLAY, XEDIT, EXTNAMES, PSTYLEMODE, OLESTARTUP
    pub flags: i32,
    /// INSUNITS
    pub insertion_units: i16,
    /// CEPSNTYPE
    pub current_plot_style_type: i16,
    /// CPSNID, present when CEPSNTYPE is 3
    pub current_plot_style: Handle,
    /// FINGERPRINTGUID
    pub fingerprint_guid: String,
    /// VERSIONGUID
    pub version_guid: String,

    // ==================== Block records and linetypes ====================
    pub paper_space_block: Handle,
    pub model_space_block: Handle,
    pub by_layer_line_type: Handle,
    pub by_block_line_type: Handle,
    pub continuous_line_type: Handle,

    /// R14+ trailing shorts
    pub trailing_shorts: [i16; 4],
}

impl HeaderVariables {
    /// Mask of the lineweight bits in [`HeaderVariables::flags`].
    pub const FLAG_CURRENT_LINE_WEIGHT: i32 = 0x1F;
    pub const FLAG_LINE_WEIGHT_HIDDEN: i32 = 0x200;
    pub const FLAG_XEDIT_DISABLED: i32 = 0x400;
    pub const FLAG_EXTENDED_NAMES: i32 = 0x800;
    pub const FLAG_PLOT_STYLE_MODE: i32 = 0x2000;
    pub const FLAG_OLE_STARTUP: i32 = 0x4000;

    pub fn extended_names(&self) -> bool {
        self.flags & Self::FLAG_EXTENDED_NAMES != 0
    }

    pub fn display_line_weight(&self) -> bool {
        self.flags & Self::FLAG_LINE_WEIGHT_HIDDEN == 0
    }

    /// Read or write every variable in wire order.
    pub fn visit<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        let sio = io.sio();

        for d in self.unknown_doubles.iter_mut() {
            io.bit_double(d)?;
        }
        for t in self.unknown_texts.iter_mut() {
            io.text(t)?;
        }
        for l in self.unknown_longs.iter_mut() {
            io.bit_long(l)?;
        }
        if sio.r13_14_only {
            io.bit_short(&mut self.unknown_short)?;
        }
        io.absolute_handle(
            &mut self.current_viewport_entity_header,
            DwgReferenceType::HardPointer,
        )?;

        io.bit(&mut self.associate_dimensions)?;
        io.bit(&mut self.update_dimensions_while_dragging)?;
        if sio.r13_14_only {
            io.bit(&mut self.dim_sav)?;
        }
        io.bit(&mut self.polyline_linetype_generation)?;
        io.bit(&mut self.ortho_mode)?;
        io.bit(&mut self.regen_mode)?;
        io.bit(&mut self.fill_mode)?;
        io.bit(&mut self.quick_text_mode)?;
        io.bit(&mut self.paper_space_linetype_scaling)?;
        io.bit(&mut self.limit_check)?;
        if sio.r13_14_only {
            io.bit(&mut self.blip_mode)?;
        }
        io.bit(&mut self.user_timer)?;
        io.bit(&mut self.sketch_polylines)?;
        io.bit(&mut self.angle_direction_clockwise)?;
        io.bit(&mut self.spline_frame)?;
        if sio.r13_14_only {
            io.bit(&mut self.attribute_request)?;
            io.bit(&mut self.attribute_dialog)?;
        }
        io.bit(&mut self.mirror_text)?;
        io.bit(&mut self.world_view)?;
        if sio.r13_14_only {
            io.bit(&mut self.wireframe)?;
        }
        io.bit(&mut self.show_model_space)?;
        io.bit(&mut self.paper_space_limit_check)?;
        io.bit(&mut self.retain_xref_visibility)?;
        if sio.r13_14_only {
            io.bit(&mut self.delete_objects)?;
        }
        io.bit(&mut self.display_silhouette)?;
        io.bit(&mut self.create_ellipse_as_polyline)?;
        io.bit_short(&mut self.proxy_graphics)?;
        if sio.r13_14_only {
            io.bit_short(&mut self.drag_mode)?;
        }

        io.bit_short(&mut self.tree_depth)?;
        io.bit_short(&mut self.linear_unit_format)?;
        io.bit_short(&mut self.linear_unit_precision)?;
        io.bit_short(&mut self.angular_unit_format)?;
        io.bit_short(&mut self.angular_unit_precision)?;
        if sio.r13_14_only {
            io.bit_short(&mut self.object_snap_mode)?;
        }
        io.bit_short(&mut self.attribute_visibility)?;
        if sio.r13_14_only {
            io.bit_short(&mut self.coords_mode)?;
        }
        io.bit_short(&mut self.point_display_mode)?;
        if sio.r13_14_only {
            io.bit_short(&mut self.pick_style)?;
        }
        for i in self.user_ints.iter_mut() {
            io.bit_short(i)?;
        }
        io.bit_short(&mut self.spline_segments)?;
        io.bit_short(&mut self.surface_u_density)?;
        io.bit_short(&mut self.surface_v_density)?;
        io.bit_short(&mut self.surface_type)?;
        io.bit_short(&mut self.surface_tab1)?;
        io.bit_short(&mut self.surface_tab2)?;
        io.bit_short(&mut self.spline_type)?;
        io.bit_short(&mut self.shade_edge)?;
        io.bit_short(&mut self.shade_diffuse)?;
        io.bit_short(&mut self.unit_mode)?;
        io.bit_short(&mut self.max_active_viewports)?;
        io.bit_short(&mut self.isolines)?;
        io.bit_short(&mut self.multiline_justification)?;
        io.bit_short(&mut self.text_quality)?;

        io.bit_double(&mut self.linetype_scale)?;
        io.bit_double(&mut self.text_height)?;
        io.bit_double(&mut self.trace_width)?;
        io.bit_double(&mut self.sketch_increment)?;
        io.bit_double(&mut self.fillet_radius)?;
        io.bit_double(&mut self.thickness)?;
        io.bit_double(&mut self.angle_base)?;
        io.bit_double(&mut self.point_display_size)?;
        io.bit_double(&mut self.polyline_width)?;
        for r in self.user_reals.iter_mut() {
            io.bit_double(r)?;
        }
        io.bit_double(&mut self.chamfer_distance_a)?;
        io.bit_double(&mut self.chamfer_distance_b)?;
        io.bit_double(&mut self.chamfer_length)?;
        io.bit_double(&mut self.chamfer_angle)?;
        io.bit_double(&mut self.facet_resolution)?;
        io.bit_double(&mut self.multiline_scale)?;
        io.bit_double(&mut self.current_entity_linetype_scale)?;
        io.text(&mut self.menu_name)?;

        io.date_time(&mut self.create_date)?;
        io.date_time(&mut self.update_date)?;
        io.time_span(&mut self.total_editing_time)?;
        io.time_span(&mut self.user_elapsed_time)?;
        io.color(&mut self.current_entity_color)?;

        io.absolute_handle(&mut self.handle_seed, DwgReferenceType::None)?;
        io.absolute_handle(&mut self.current_layer, DwgReferenceType::HardPointer)?;
        io.absolute_handle(&mut self.current_text_style, DwgReferenceType::HardPointer)?;
        io.absolute_handle(&mut self.current_line_type, DwgReferenceType::HardPointer)?;
        io.absolute_handle(&mut self.current_dim_style, DwgReferenceType::HardPointer)?;
        io.absolute_handle(&mut self.current_multiline_style, DwgReferenceType::HardPointer)?;
        if sio.r2000_plus {
            io.bit_double(&mut self.viewport_scale_factor)?;
        }

        io.point3(&mut self.paper_space_insertion_base)?;
        io.point3(&mut self.paper_space_extents_min)?;
        io.point3(&mut self.paper_space_extents_max)?;
        io.point2_raw(&mut self.paper_space_limits_min)?;
        io.point2_raw(&mut self.paper_space_limits_max)?;
        io.bit_double(&mut self.paper_elevation)?;
        io.point3(&mut self.paper_space_ucs_origin)?;
        io.point3(&mut self.paper_space_ucs_x_axis)?;
        io.point3(&mut self.paper_space_ucs_y_axis)?;
        io.absolute_handle(&mut self.paper_space_ucs, DwgReferenceType::HardPointer)?;
        if sio.r2000_plus {
            io.absolute_handle(&mut self.paper_ucs_ortho_ref, DwgReferenceType::HardPointer)?;
            io.bit_short(&mut self.paper_ucs_ortho_view)?;
            io.absolute_handle(&mut self.paper_ucs_base, DwgReferenceType::HardPointer)?;
            for p in self.paper_ucs_ortho_origins.iter_mut() {
                io.point3(p)?;
            }
        }

        io.point3(&mut self.model_space_insertion_base)?;
        io.point3(&mut self.model_space_extents_min)?;
        io.point3(&mut self.model_space_extents_max)?;
        io.point2_raw(&mut self.model_space_limits_min)?;
        io.point2_raw(&mut self.model_space_limits_max)?;
        io.bit_double(&mut self.elevation)?;
        io.point3(&mut self.model_space_ucs_origin)?;
        io.point3(&mut self.model_space_ucs_x_axis)?;
        io.point3(&mut self.model_space_ucs_y_axis)?;
        io.absolute_handle(&mut self.model_space_ucs, DwgReferenceType::HardPointer)?;
        if sio.r2000_plus {
            io.absolute_handle(&mut self.ucs_ortho_ref, DwgReferenceType::HardPointer)?;
            io.bit_short(&mut self.ucs_ortho_view)?;
            io.absolute_handle(&mut self.ucs_base, DwgReferenceType::HardPointer)?;
            for p in self.model_ucs_ortho_origins.iter_mut() {
                io.point3(p)?;
            }
        }

        self.dimension.visit_leading(io)?;
        if sio.r13_14_only {
            io.absolute_handle(&mut self.dim_text_style, DwgReferenceType::HardPointer)?;
        }
        self.dimension.visit_body(io)?;
        if sio.r2000_plus {
            io.absolute_handle(&mut self.dim_text_style, DwgReferenceType::HardPointer)?;
            io.absolute_handle(&mut self.dim_leader_block, DwgReferenceType::HardPointer)?;
            io.absolute_handle(&mut self.dim_arrow_block_handle, DwgReferenceType::HardPointer)?;
            io.absolute_handle(&mut self.dim_arrow_block1_handle, DwgReferenceType::HardPointer)?;
            io.absolute_handle(&mut self.dim_arrow_block2_handle, DwgReferenceType::HardPointer)?;
        }
        self.dimension.visit_line_weights(io)?;

        io.absolute_handle(&mut self.block_control, DwgReferenceType::HardOwner)?;
        io.absolute_handle(&mut self.layer_control, DwgReferenceType::HardOwner)?;
        io.absolute_handle(&mut self.style_control, DwgReferenceType::HardOwner)?;
        io.absolute_handle(&mut self.line_type_control, DwgReferenceType::HardOwner)?;
        io.absolute_handle(&mut self.view_control, DwgReferenceType::HardOwner)?;
        io.absolute_handle(&mut self.ucs_control, DwgReferenceType::HardOwner)?;
        io.absolute_handle(&mut self.vport_control, DwgReferenceType::HardOwner)?;
        io.absolute_handle(&mut self.app_id_control, DwgReferenceType::HardOwner)?;
        io.absolute_handle(&mut self.dim_style_control, DwgReferenceType::HardOwner)?;
        io.absolute_handle(
            &mut self.viewport_entity_header_control,
            DwgReferenceType::HardOwner,
        )?;
        io.absolute_handle(&mut self.group_dictionary, DwgReferenceType::HardPointer)?;
        io.absolute_handle(
            &mut self.multiline_style_dictionary,
            DwgReferenceType::HardPointer,
        )?;
        io.absolute_handle(&mut self.named_objects_dictionary, DwgReferenceType::HardOwner)?;

        if sio.r2000_plus {
            io.bit_short(&mut self.stacked_text_alignment)?;
            io.bit_short(&mut self.stacked_text_size_percentage)?;
            io.text(&mut self.hyperlink_base)?;
            io.text(&mut self.stylesheet)?;
            io.absolute_handle(&mut self.layouts_dictionary, DwgReferenceType::HardPointer)?;
            io.absolute_handle(
                &mut self.plot_settings_dictionary,
                DwgReferenceType::HardPointer,
            )?;
            io.absolute_handle(&mut self.plot_styles_dictionary, DwgReferenceType::HardPointer)?;

            io.bit_long(&mut self.flags)?;
            io.bit_short(&mut self.insertion_units)?;
            io.bit_short(&mut self.current_plot_style_type)?;
            if self.current_plot_style_type == 3 {
                io.absolute_handle(&mut self.current_plot_style, DwgReferenceType::HardPointer)?;
            }
            io.text(&mut self.fingerprint_guid)?;
            io.text(&mut self.version_guid)?;
        }

        io.absolute_handle(&mut self.paper_space_block, DwgReferenceType::HardPointer)?;
        io.absolute_handle(&mut self.model_space_block, DwgReferenceType::HardPointer)?;
        io.absolute_handle(&mut self.by_layer_line_type, DwgReferenceType::HardPointer)?;
        io.absolute_handle(&mut self.by_block_line_type, DwgReferenceType::HardPointer)?;
        io.absolute_handle(&mut self.continuous_line_type, DwgReferenceType::HardPointer)?;

        if sio.version() >= crate::types::DwgVersion::AC1014 {
            for s in self.trailing_shorts.iter_mut() {
                io.bit_short(s)?;
            }
        }

        Ok(())
    }
}

impl Default for HeaderVariables {
    fn default() -> Self {
        Self {
            unknown_doubles: [412_148_564_080.0, 1.0, 1.0, 1.0],
            unknown_texts: ["m".to_string(), String::new(), String::new(), String::new()],
            unknown_longs: [24, 0],
            unknown_short: 0,
            current_viewport_entity_header: Handle::NULL,

            associate_dimensions: true,
            update_dimensions_while_dragging: true,
            dim_sav: false,
            polyline_linetype_generation: false,
            ortho_mode: false,
            regen_mode: true,
            fill_mode: true,
            quick_text_mode: false,
            paper_space_linetype_scaling: true,
            limit_check: false,
            blip_mode: false,
            user_timer: true,
            sketch_polylines: false,
            angle_direction_clockwise: false,
            spline_frame: false,
            attribute_request: true,
            attribute_dialog: true,
            mirror_text: false,
            world_view: true,
            wireframe: false,
            show_model_space: true,
            paper_space_limit_check: false,
            retain_xref_visibility: true,
            delete_objects: true,
            display_silhouette: false,
            create_ellipse_as_polyline: false,
            proxy_graphics: 1,
            drag_mode: 2,

            tree_depth: 3020,
            linear_unit_format: 2,
            linear_unit_precision: 4,
            angular_unit_format: 0,
            angular_unit_precision: 0,
            object_snap_mode: 37,
            attribute_visibility: 1,
            coords_mode: 1,
            point_display_mode: 0,
            pick_style: 1,
            user_ints: [0; 5],
            spline_segments: 8,
            surface_u_density: 6,
            surface_v_density: 6,
            surface_type: 6,
            surface_tab1: 6,
            surface_tab2: 6,
            spline_type: 6,
            shade_edge: 3,
            shade_diffuse: 70,
            unit_mode: 0,
            max_active_viewports: 64,
            isolines: 4,
            multiline_justification: 0,
            text_quality: 50,

            linetype_scale: 1.0,
            text_height: 0.2,
            trace_width: 0.05,
            sketch_increment: 0.1,
            fillet_radius: 0.0,
            thickness: 0.0,
            angle_base: 0.0,
            point_display_size: 0.0,
            polyline_width: 0.0,
            user_reals: [0.0; 5],
            chamfer_distance_a: 0.0,
            chamfer_distance_b: 0.0,
            chamfer_length: 0.0,
            chamfer_angle: 0.0,
            facet_resolution: 0.5,
            multiline_scale: 1.0,
            current_entity_linetype_scale: 1.0,
            menu_name: "acad".to_string(),

            create_date: DwgDateTime::new(2_451_545, 0),
            update_date: DwgDateTime::new(2_451_545, 0),
            total_editing_time: DwgTimeSpan::default(),
            user_elapsed_time: DwgTimeSpan::default(),
            current_entity_color: Color::BY_LAYER,

            handle_seed: Handle::NULL,
            current_layer: Handle::NULL,
            current_text_style: Handle::NULL,
            current_line_type: Handle::NULL,
            current_dim_style: Handle::NULL,
            current_multiline_style: Handle::NULL,
            viewport_scale_factor: 0.0,

            paper_space_insertion_base: Vector3::ZERO,
            paper_space_extents_min: Vector3::new(1.0e20, 1.0e20, 1.0e20),
            paper_space_extents_max: Vector3::new(-1.0e20, -1.0e20, -1.0e20),
            paper_space_limits_min: Vector2::ZERO,
            paper_space_limits_max: Vector2::new(12.0, 9.0),
            paper_elevation: 0.0,
            paper_space_ucs_origin: Vector3::ZERO,
            paper_space_ucs_x_axis: Vector3::new(1.0, 0.0, 0.0),
            paper_space_ucs_y_axis: Vector3::new(0.0, 1.0, 0.0),
            paper_space_ucs: Handle::NULL,
            paper_ucs_ortho_ref: Handle::NULL,
            paper_ucs_ortho_view: 0,
            paper_ucs_base: Handle::NULL,
            paper_ucs_ortho_origins: [Vector3::ZERO; 6],

            model_space_insertion_base: Vector3::ZERO,
            model_space_extents_min: Vector3::new(1.0e20, 1.0e20, 1.0e20),
            model_space_extents_max: Vector3::new(-1.0e20, -1.0e20, -1.0e20),
            model_space_limits_min: Vector2::ZERO,
            model_space_limits_max: Vector2::new(12.0, 9.0),
            elevation: 0.0,
            model_space_ucs_origin: Vector3::ZERO,
            model_space_ucs_x_axis: Vector3::new(1.0, 0.0, 0.0),
            model_space_ucs_y_axis: Vector3::new(0.0, 1.0, 0.0),
            model_space_ucs: Handle::NULL,
            ucs_ortho_ref: Handle::NULL,
            ucs_ortho_view: 0,
            ucs_base: Handle::NULL,
            model_ucs_ortho_origins: [Vector3::ZERO; 6],

            dimension: DimensionVariables::default(),
            dim_text_style: Handle::NULL,
            dim_leader_block: Handle::NULL,
            dim_arrow_block_handle: Handle::NULL,
            dim_arrow_block1_handle: Handle::NULL,
            dim_arrow_block2_handle: Handle::NULL,

            block_control: Handle::NULL,
            layer_control: Handle::NULL,
            style_control: Handle::NULL,
            line_type_control: Handle::NULL,
            view_control: Handle::NULL,
            ucs_control: Handle::NULL,
            vport_control: Handle::NULL,
            app_id_control: Handle::NULL,
            dim_style_control: Handle::NULL,
            viewport_entity_header_control: Handle::NULL,
            group_dictionary: Handle::NULL,
            multiline_style_dictionary: Handle::NULL,
            named_objects_dictionary: Handle::NULL,

            stacked_text_alignment: 1,
            stacked_text_size_percentage: 70,
            hyperlink_base: String::new(),
            stylesheet: String::new(),
            layouts_dictionary: Handle::NULL,
            plot_settings_dictionary: Handle::NULL,
            plot_styles_dictionary: Handle::NULL,
            // CELWEIGHT ByLayer, lineweight display off
            flags: 0x1D | Self::FLAG_LINE_WEIGHT_HIDDEN,
            insertion_units: 0,
            current_plot_style_type: 0,
            current_plot_style: Handle::NULL,
            fingerprint_guid: "{00000000-0000-0000-0000-000000000000}".to_string(),
            version_guid: "{00000000-0000-0000-0000-000000000000}".to_string(),

            paper_space_block: Handle::NULL,
            model_space_block: Handle::NULL,
            by_layer_line_type: Handle::NULL,
            by_block_line_type: Handle::NULL,
            continuous_line_type: Handle::NULL,

            trailing_shorts: [-1; 4],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dwg::reader::DwgStreamReader;
    use crate::io::dwg::writer::DwgStreamWriter;
    use crate::types::DwgVersion;

    fn round_trip(version: DwgVersion, header: &HeaderVariables) -> HeaderVariables {
        let mut source = header.clone();
        let mut writer = DwgStreamWriter::new(version);
        source.visit(&mut writer).unwrap();
        let bytes = writer.finish();

        let mut reader = DwgStreamReader::new(&bytes, version);
        let mut parsed = HeaderVariables::default();
        parsed.visit(&mut reader).unwrap();
        parsed
    }

    #[test]
    fn test_default_round_trips_for_every_version() {
        for version in DwgVersion::ALL {
            let header = HeaderVariables::default();
            assert_eq!(round_trip(version, &header), header, "{}", version);
        }
    }

    #[test]
    fn test_handles_and_r2000_fields_survive() {
        let mut header = HeaderVariables::default();
        header.handle_seed = Handle::new(0x1234);
        header.layer_control = Handle::new(0x2);
        header.current_plot_style_type = 3;
        header.current_plot_style = Handle::new(0x99);
        header.dim_text_style = Handle::new(0x11);
        header.hyperlink_base = "http://example.com/".to_string();
        let parsed = round_trip(DwgVersion::AC1015, &header);
        assert_eq!(parsed, header);
        assert_eq!(parsed.current_plot_style, Handle::new(0x99));
    }

    #[test]
    fn test_r13_dimension_chars() {
        let mut header = HeaderVariables::default();
        header.dimension.text_above = 1;
        header.dimension.fit = 5;
        header.dimension.arrow_block = "_DOT".to_string();
        header.dim_text_style = Handle::new(0x11);
        let parsed = round_trip(DwgVersion::AC1012, &header);
        assert_eq!(parsed.dimension.text_above, 1);
        assert_eq!(parsed.dimension.fit, 5);
        assert_eq!(parsed.dimension.arrow_block, "_DOT");
        assert_eq!(parsed.dim_text_style, Handle::new(0x11));
    }

    #[test]
    fn test_flag_accessors() {
        let header = HeaderVariables::default();
        assert!(!header.display_line_weight());
        assert!(!header.extended_names());
    }
}
