//! C ABI with the libemproto symbol names, so existing C agents and controllers
//! can link empower-core as a static or shared library.
//!
//! Every symbol forwards to the flat Rust operation of the same name and only
//! translates arguments and results. Buffers are `(buf, size)` pairs and every
//! write is bounds checked against `size`. Null out-pointers are skipped.

use std::os::raw::{c_char, c_int, c_uint};
use std::slice;

use crate::codec::Result;
use crate::event;
use crate::header;
use crate::messages::*;
use crate::protocol::{
    ActionType, CellCapabilities, Direction, EnbCapabilities, HandoverCause, MsgType, Operation,
    ENB_CAP_MAX_CELLS, EP_ERROR, EP_SUCCESS, UE_MEASURE_MAX_UES,
};
use crate::records::{CellDetails, HeaderId, MacReport, UeDetails, UeMeasure};

/// Cell details as laid out for C callers.
#[allow(non_camel_case_types)]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ep_cell_det {
    pub pci: u16,
    pub cap: u32,
    pub dl_earfcn: u16,
    pub ul_earfcn: u16,
    pub dl_prbs: u8,
    pub ul_prbs: u8,
}

#[allow(non_camel_case_types)]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ep_ue_details {
    pub pci: u16,
    pub plmn: u32,
    pub rnti: u16,
    pub imsi: u64,
}

#[allow(non_camel_case_types)]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ep_ue_measure {
    pub meas_id: u8,
    pub rnti: u16,
    pub pci: u16,
    pub earfcn: u16,
    pub rsrp: i16,
    pub rsrq: i16,
}

#[allow(non_camel_case_types)]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ep_macrep_det {
    pub dl_prbs_total: u8,
    pub dl_prbs_used: u32,
    pub ul_prbs_total: u8,
    pub ul_prbs_used: u32,
}

impl From<&ep_cell_det> for CellDetails {
    fn from(c: &ep_cell_det) -> Self {
        CellDetails {
            pci: c.pci,
            cap: CellCapabilities(c.cap),
            dl_earfcn: c.dl_earfcn,
            dl_prbs: c.dl_prbs,
            ul_earfcn: c.ul_earfcn,
            ul_prbs: c.ul_prbs,
        }
    }
}

impl From<&CellDetails> for ep_cell_det {
    fn from(c: &CellDetails) -> Self {
        ep_cell_det {
            pci: c.pci,
            cap: c.cap.bits(),
            dl_earfcn: c.dl_earfcn,
            ul_earfcn: c.ul_earfcn,
            dl_prbs: c.dl_prbs,
            ul_prbs: c.ul_prbs,
        }
    }
}

impl From<&ep_ue_details> for UeDetails {
    fn from(u: &ep_ue_details) -> Self {
        UeDetails {
            pci: u.pci,
            plmn: u.plmn,
            rnti: u.rnti,
            imsi: u.imsi,
        }
    }
}

impl From<&UeDetails> for ep_ue_details {
    fn from(u: &UeDetails) -> Self {
        ep_ue_details {
            pci: u.pci,
            plmn: u.plmn,
            rnti: u.rnti,
            imsi: u.imsi,
        }
    }
}

impl From<&ep_ue_measure> for UeMeasure {
    fn from(m: &ep_ue_measure) -> Self {
        UeMeasure {
            meas_id: m.meas_id,
            rnti: m.rnti,
            pci: m.pci,
            earfcn: m.earfcn,
            rsrp: m.rsrp,
            rsrq: m.rsrq,
        }
    }
}

impl From<&UeMeasure> for ep_ue_measure {
    fn from(m: &UeMeasure) -> Self {
        ep_ue_measure {
            meas_id: m.meas_id,
            rnti: m.rnti,
            pci: m.pci,
            earfcn: m.earfcn,
            rsrp: m.rsrp,
            rsrq: m.rsrq,
        }
    }
}

impl From<&ep_macrep_det> for MacReport {
    fn from(d: &ep_macrep_det) -> Self {
        MacReport {
            dl_prbs_total: d.dl_prbs_total,
            dl_prbs_used: d.dl_prbs_used,
            ul_prbs_total: d.ul_prbs_total,
            ul_prbs_used: d.ul_prbs_used,
        }
    }
}

impl From<&MacReport> for ep_macrep_det {
    fn from(d: &MacReport) -> Self {
        ep_macrep_det {
            dl_prbs_total: d.dl_prbs_total,
            dl_prbs_used: d.dl_prbs_used,
            ul_prbs_total: d.ul_prbs_total,
            ul_prbs_used: d.ul_prbs_used,
        }
    }
}

fn out_buf<'a>(buf: *mut c_char, size: c_uint) -> Option<&'a mut [u8]> {
    if buf.is_null() {
        return None;
    }
    Some(unsafe { slice::from_raw_parts_mut(buf as *mut u8, size as usize) })
}

fn in_buf<'a>(buf: *const c_char, size: c_uint) -> Option<&'a [u8]> {
    if buf.is_null() {
        return None;
    }
    Some(unsafe { slice::from_raw_parts(buf as *const u8, size as usize) })
}

fn records<'a, T>(ptr: *const T, len: usize) -> Option<&'a [T]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { slice::from_raw_parts(ptr, len) })
}

fn store<T>(out: *mut T, value: T) {
    if !out.is_null() {
        unsafe { *out = value };
    }
}

fn formatted(result: Result<usize>) -> c_int {
    match result {
        Ok(n) => n as c_int,
        Err(e) => e.status(),
    }
}

fn parsed<T>(result: Result<T>, fill: impl FnOnce(T)) -> c_int {
    match result {
        Ok(value) => {
            fill(value);
            EP_SUCCESS
        }
        Err(e) => e.status(),
    }
}

fn code<T>(value: c_int, from: fn(u8) -> Option<T>) -> Option<T> {
    u8::try_from(value).ok().and_then(from)
}

/// Formatter taking only the header ids.
macro_rules! format_ids {
    ($($symbol:ident => $op:path;)*) => {
        $(#[no_mangle]
        pub extern "C" fn $symbol(
            buf: *mut c_char,
            size: c_uint,
            enb_id: u32,
            cell_id: u16,
            mod_id: u32,
        ) -> c_int {
            match out_buf(buf, size) {
                Some(b) => formatted($op(b, HeaderId::new(enb_id, cell_id, mod_id))),
                None => EP_ERROR,
            }
        })*
    };
}

/// Parser of a request whose body carries nothing.
macro_rules! parse_empty {
    ($($symbol:ident => $op:path;)*) => {
        $(#[no_mangle]
        pub extern "C" fn $symbol(buf: *const c_char, size: c_uint) -> c_int {
            match in_buf(buf, size) {
                Some(b) => parsed($op(b), |_| ()),
                None => EP_ERROR,
            }
        })*
    };
}

// Header.

#[no_mangle]
pub extern "C" fn epf_head(
    buf: *mut c_char,
    size: c_uint,
    msg_type: c_int,
    enb_id: u32,
    cell_id: u16,
    mod_id: u32,
) -> c_int {
    let (Some(b), Some(t)) = (out_buf(buf, size), code(msg_type, MsgType::from_u8)) else {
        return EP_ERROR;
    };
    formatted(header::format_head(b, t, HeaderId::new(enb_id, cell_id, mod_id)))
}

#[no_mangle]
pub extern "C" fn epp_head(
    buf: *const c_char,
    size: c_uint,
    msg_type: *mut c_int,
    enb_id: *mut u32,
    cell_id: *mut u16,
    mod_id: *mut u32,
) -> c_int {
    let Some(b) = in_buf(buf, size) else {
        return EP_ERROR;
    };
    parsed(header::parse_head(b), |(t, id)| {
        store(msg_type, t as c_int);
        store(enb_id, id.enb_id);
        store(cell_id, id.cell_id);
        store(mod_id, id.mod_id);
    })
}

/// Message type, or `Invalid` for a null or short buffer.
#[no_mangle]
pub extern "C" fn epp_msg_type(buf: *const c_char, size: c_uint) -> c_int {
    in_buf(buf, size).map_or(MsgType::Invalid, header::msg_type) as c_int
}

/// Sequence number, 0 if the buffer is null or short.
#[no_mangle]
pub extern "C" fn epp_seq(buf: *const c_char, size: c_uint) -> u32 {
    in_buf(buf, size)
        .and_then(|b| header::seq(b).ok())
        .unwrap_or(0)
}

#[no_mangle]
pub extern "C" fn epp_msg_length(buf: *const c_char, size: c_uint) -> u16 {
    in_buf(buf, size)
        .and_then(|b| header::msg_length(b).ok())
        .unwrap_or(0)
}

#[no_mangle]
pub extern "C" fn epf_seq(buf: *mut c_char, size: c_uint, seq: u32) -> c_int {
    match out_buf(buf, size) {
        Some(b) => parsed(header::set_seq(b, seq), |_| ()),
        None => EP_ERROR,
    }
}

#[no_mangle]
pub extern "C" fn epf_msg_length(buf: *mut c_char, size: c_uint, len: u16) -> c_int {
    match out_buf(buf, size) {
        Some(b) => parsed(header::set_msg_length(b, len), |_| ()),
        None => EP_ERROR,
    }
}

// Event headers.

fn event_args(
    action: c_int,
    op: c_int,
    dir: c_int,
) -> Option<(ActionType, Operation, Direction)> {
    Some((
        code(action, ActionType::from_u8)?,
        code(op, Operation::from_u8)?,
        code(dir, Direction::from_u8)?,
    ))
}

fn dir_code(result: Result<Direction>) -> c_int {
    result.map_or(EP_ERROR, |d| d as c_int)
}

#[no_mangle]
pub extern "C" fn epf_single(buf: *mut c_char, size: c_uint, action: c_int, op: c_int, dir: c_int) -> c_int {
    let (Some(b), Some((a, o, d))) = (out_buf(buf, size), event_args(action, op, dir)) else {
        return EP_ERROR;
    };
    formatted(event::format_single(b, a, o, d))
}

#[no_mangle]
pub extern "C" fn epp_single_dir(buf: *const c_char, size: c_uint) -> c_int {
    in_buf(buf, size).map_or(EP_ERROR, |b| dir_code(event::single_dir(b)))
}

#[no_mangle]
pub extern "C" fn epp_single_type(buf: *const c_char, size: c_uint) -> c_int {
    in_buf(buf, size).map_or(ActionType::Invalid, event::single_type) as c_int
}

#[no_mangle]
pub extern "C" fn epf_schedule(
    buf: *mut c_char,
    size: c_uint,
    action: c_int,
    op: c_int,
    dir: c_int,
    interval: u32,
) -> c_int {
    let (Some(b), Some((a, o, d))) = (out_buf(buf, size), event_args(action, op, dir)) else {
        return EP_ERROR;
    };
    formatted(event::format_schedule(b, a, o, d, interval))
}

#[no_mangle]
pub extern "C" fn epp_schedule_dir(buf: *const c_char, size: c_uint) -> c_int {
    in_buf(buf, size).map_or(EP_ERROR, |b| dir_code(event::schedule_dir(b)))
}

/// Schedule interval in milliseconds, 0 if the buffer is null or short.
#[no_mangle]
pub extern "C" fn epp_sched_interval(buf: *const c_char, size: c_uint) -> u32 {
    in_buf(buf, size)
        .and_then(|b| event::schedule_interval(b).ok())
        .unwrap_or(0)
}

#[no_mangle]
pub extern "C" fn epp_schedule_type(buf: *const c_char, size: c_uint) -> c_int {
    in_buf(buf, size).map_or(ActionType::Invalid, event::schedule_type) as c_int
}

#[no_mangle]
pub extern "C" fn epf_trigger(buf: *mut c_char, size: c_uint, action: c_int, op: c_int, dir: c_int) -> c_int {
    let (Some(b), Some((a, o, d))) = (out_buf(buf, size), event_args(action, op, dir)) else {
        return EP_ERROR;
    };
    formatted(event::format_trigger(b, a, o, d))
}

#[no_mangle]
pub extern "C" fn epp_trigger_dir(buf: *const c_char, size: c_uint) -> c_int {
    in_buf(buf, size).map_or(EP_ERROR, |b| dir_code(event::trigger_dir(b)))
}

#[no_mangle]
pub extern "C" fn epp_trigger_op(buf: *const c_char, size: c_uint) -> c_int {
    in_buf(buf, size)
        .and_then(|b| event::trigger_op(b).ok())
        .map_or(EP_ERROR, |o| o as c_int)
}

#[no_mangle]
pub extern "C" fn epp_trigger_type(buf: *const c_char, size: c_uint) -> c_int {
    in_buf(buf, size).map_or(ActionType::Invalid, event::trigger_type) as c_int
}

// Hello.

macro_rules! hello {
    ($format:ident => $fop:path, $parse:ident => $pop:path) => {
        #[no_mangle]
        pub extern "C" fn $format(
            buf: *mut c_char,
            size: c_uint,
            enb_id: u32,
            cell_id: u16,
            mod_id: u32,
            id: u32,
        ) -> c_int {
            match out_buf(buf, size) {
                Some(b) => formatted($fop(b, HeaderId::new(enb_id, cell_id, mod_id), id)),
                None => EP_ERROR,
            }
        }

        #[no_mangle]
        pub extern "C" fn $parse(buf: *const c_char, size: c_uint, id: *mut u32) -> c_int {
            match in_buf(buf, size) {
                Some(b) => parsed($pop(b), |v| store(id, v)),
                None => EP_ERROR,
            }
        }
    };
}

hello!(epf_single_hello_req => format_single_hello_req, epp_single_hello_req => parse_single_hello_req);
hello!(epf_single_hello_rep => format_single_hello_rep, epp_single_hello_rep => parse_single_hello_rep);

#[no_mangle]
pub extern "C" fn epf_sched_hello_req(
    buf: *mut c_char,
    size: c_uint,
    enb_id: u32,
    cell_id: u16,
    mod_id: u32,
    interval: u32,
    id: u32,
) -> c_int {
    match out_buf(buf, size) {
        Some(b) => formatted(format_sched_hello_req(
            b,
            HeaderId::new(enb_id, cell_id, mod_id),
            interval,
            id,
        )),
        None => EP_ERROR,
    }
}

#[no_mangle]
pub extern "C" fn epp_sched_hello_req(buf: *const c_char, size: c_uint, id: *mut u32) -> c_int {
    match in_buf(buf, size) {
        Some(b) => parsed(parse_sched_hello_req(b), |v| store(id, v)),
        None => EP_ERROR,
    }
}

#[no_mangle]
pub extern "C" fn epf_sched_hello_rep(
    buf: *mut c_char,
    size: c_uint,
    enb_id: u32,
    cell_id: u16,
    mod_id: u32,
    interval: u32,
    id: u32,
) -> c_int {
    match out_buf(buf, size) {
        Some(b) => formatted(format_sched_hello_rep(
            b,
            HeaderId::new(enb_id, cell_id, mod_id),
            interval,
            id,
        )),
        None => EP_ERROR,
    }
}

#[no_mangle]
pub extern "C" fn epp_sched_hello_rep(buf: *const c_char, size: c_uint, id: *mut u32) -> c_int {
    match in_buf(buf, size) {
        Some(b) => parsed(parse_sched_hello_rep(b), |v| store(id, v)),
        None => EP_ERROR,
    }
}

// Negative replies and empty requests.

format_ids! {
    epf_single_ecap_rep_fail => format_single_ecap_rep_fail;
    epf_single_ecap_req => format_single_ecap_req;
    epf_single_ccap_rep_fail => format_single_ccap_rep_fail;
    epf_single_ccap_req => format_single_ccap_req;
    epf_trigger_uerep_rep_fail => format_trigger_uerep_rep_fail;
    epf_trigger_uemeas_rep_fail => format_trigger_uemeas_rep_fail;
    epf_trigger_macrep_rep_fail => format_trigger_macrep_rep_fail;
    epf_trigger_macrep_rep_ns => format_trigger_macrep_rep_ns;
    epf_single_ho_rep_fail => format_single_ho_rep_fail;
    epf_single_ho_rep_ns => format_single_ho_rep_ns;
}

parse_empty! {
    epp_single_ecap_req => parse_single_ecap_req;
    epp_single_ccap_req => parse_single_ccap_req;
    epp_trigger_uerep_req => parse_trigger_uerep_req;
}

// eNB capabilities.

#[no_mangle]
pub extern "C" fn epf_single_ecap_rep(
    buf: *mut c_char,
    size: c_uint,
    enb_id: u32,
    cell_id: u16,
    mod_id: u32,
    cap_mask: u32,
    cells: *const ep_cell_det,
    nof_cells: u32,
) -> c_int {
    let (Some(b), Some(cells)) = (out_buf(buf, size), records(cells, nof_cells as usize)) else {
        return EP_ERROR;
    };
    let cells: Vec<CellDetails> = cells.iter().map(CellDetails::from).collect();
    formatted(format_single_ecap_rep(
        b,
        HeaderId::new(enb_id, cell_id, mod_id),
        EnbCapabilities(cap_mask),
        &cells,
    ))
}

/// `cells` must hold `ENB_CAP_MAX_CELLS` entries; `nof_cells` receives the advertised count.
#[no_mangle]
pub extern "C" fn epp_single_ecap_rep(
    buf: *const c_char,
    size: c_uint,
    cap_mask: *mut u32,
    cells: *mut ep_cell_det,
    nof_cells: *mut u32,
) -> c_int {
    let Some(b) = in_buf(buf, size) else {
        return EP_ERROR;
    };
    parsed(parse_single_ecap_rep(b), |(cap, list)| {
        store(cap_mask, cap.bits());
        store(nof_cells, list.len() as u32);
        if !cells.is_null() {
            for (i, cell) in list.iter().take(ENB_CAP_MAX_CELLS).enumerate() {
                unsafe { *cells.add(i) = cell.into() };
            }
        }
    })
}

// Cell capabilities.

#[no_mangle]
pub extern "C" fn epf_single_ccap_rep(
    buf: *mut c_char,
    size: c_uint,
    enb_id: u32,
    cell_id: u16,
    mod_id: u32,
    cell: *const ep_cell_det,
) -> c_int {
    let Some(b) = out_buf(buf, size) else {
        return EP_ERROR;
    };
    if cell.is_null() {
        return EP_ERROR;
    }
    let cell = CellDetails::from(unsafe { &*cell });
    formatted(format_single_ccap_rep(b, HeaderId::new(enb_id, cell_id, mod_id), &cell))
}

#[no_mangle]
pub extern "C" fn epp_single_ccap_rep(buf: *const c_char, size: c_uint, cell: *mut ep_cell_det) -> c_int {
    match in_buf(buf, size) {
        Some(b) => parsed(parse_single_ccap_rep(b), |c| store(cell, (&c).into())),
        None => EP_ERROR,
    }
}

// UE report.

#[no_mangle]
pub extern "C" fn epf_trigger_uerep_rep(
    buf: *mut c_char,
    size: c_uint,
    enb_id: u32,
    cell_id: u16,
    mod_id: u32,
    nof_ues: u32,
    max_ues: u32,
    ues: *const ep_ue_details,
) -> c_int {
    let n = nof_ues.min(max_ues) as usize;
    let (Some(b), Some(ues)) = (out_buf(buf, size), records(ues, n)) else {
        return EP_ERROR;
    };
    let ues: Vec<UeDetails> = ues.iter().map(UeDetails::from).collect();
    formatted(format_trigger_uerep_rep(
        b,
        HeaderId::new(enb_id, cell_id, mod_id),
        &ues,
        max_ues as usize,
    ))
}

/// Copies at most `max_ues` entries into `ues`; `nof_ues` receives the advertised count.
#[no_mangle]
pub extern "C" fn epp_trigger_uerep_rep(
    buf: *const c_char,
    size: c_uint,
    nof_ues: *mut u32,
    max_ues: u32,
    ues: *mut ep_ue_details,
) -> c_int {
    let Some(b) = in_buf(buf, size) else {
        return EP_ERROR;
    };
    parsed(parse_trigger_uerep_rep(b, max_ues as usize), |(declared, list)| {
        store(nof_ues, declared);
        if !ues.is_null() {
            for (i, ue) in list.iter().enumerate() {
                unsafe { *ues.add(i) = ue.into() };
            }
        }
    })
}

#[no_mangle]
pub extern "C" fn epf_trigger_uerep_req(
    buf: *mut c_char,
    size: c_uint,
    enb_id: u32,
    cell_id: u16,
    mod_id: u32,
    op: c_int,
) -> c_int {
    let (Some(b), Some(op)) = (out_buf(buf, size), code(op, Operation::from_u8)) else {
        return EP_ERROR;
    };
    formatted(format_trigger_uerep_req(b, HeaderId::new(enb_id, cell_id, mod_id), op))
}

// UE measurement.

#[no_mangle]
pub extern "C" fn epf_trigger_uemeas_rep(
    buf: *mut c_char,
    size: c_uint,
    enb_id: u32,
    cell_id: u16,
    mod_id: u32,
    nof_ues: u32,
    ues: *const ep_ue_measure,
) -> c_int {
    let (Some(b), Some(ues)) = (out_buf(buf, size), records(ues, nof_ues as usize)) else {
        return EP_ERROR;
    };
    let measures: Vec<UeMeasure> = ues.iter().map(UeMeasure::from).collect();
    formatted(format_trigger_uemeas_rep(b, HeaderId::new(enb_id, cell_id, mod_id), &measures))
}

/// `ues` must hold `UE_MEASURE_MAX_UES` entries; `nof_ues` receives the advertised count.
#[no_mangle]
pub extern "C" fn epp_trigger_uemeas_rep(
    buf: *const c_char,
    size: c_uint,
    nof_ues: *mut u32,
    ues: *mut ep_ue_measure,
) -> c_int {
    let Some(b) = in_buf(buf, size) else {
        return EP_ERROR;
    };
    parsed(parse_trigger_uemeas_rep(b), |list| {
        store(nof_ues, list.len() as u32);
        if !ues.is_null() {
            for (i, m) in list.iter().take(UE_MEASURE_MAX_UES).enumerate() {
                unsafe { *ues.add(i) = m.into() };
            }
        }
    })
}

#[no_mangle]
pub extern "C" fn epf_trigger_uemeas_req(
    buf: *mut c_char,
    size: c_uint,
    enb_id: u32,
    cell_id: u16,
    mod_id: u32,
    op: c_int,
    meas_id: u8,
    pci: u16,
    earfcn: u16,
) -> c_int {
    let (Some(b), Some(op)) = (out_buf(buf, size), code(op, Operation::from_u8)) else {
        return EP_ERROR;
    };
    formatted(format_trigger_uemeas_req(
        b,
        HeaderId::new(enb_id, cell_id, mod_id),
        op,
        meas_id,
        pci,
        earfcn,
    ))
}

#[no_mangle]
pub extern "C" fn epp_trigger_uemeas_req(
    buf: *const c_char,
    size: c_uint,
    meas_id: *mut u8,
    pci: *mut u16,
    earfcn: *mut u16,
) -> c_int {
    let Some(b) = in_buf(buf, size) else {
        return EP_ERROR;
    };
    parsed(parse_trigger_uemeas_req(b), |req| {
        store(meas_id, req.meas_id);
        store(pci, req.pci);
        store(earfcn, req.earfcn);
    })
}

// MAC report.

#[no_mangle]
pub extern "C" fn epf_trigger_macrep_rep(
    buf: *mut c_char,
    size: c_uint,
    enb_id: u32,
    cell_id: u16,
    mod_id: u32,
    det: *const ep_macrep_det,
) -> c_int {
    let Some(b) = out_buf(buf, size) else {
        return EP_ERROR;
    };
    if det.is_null() {
        return EP_ERROR;
    }
    let report = MacReport::from(unsafe { &*det });
    formatted(format_trigger_macrep_rep(b, HeaderId::new(enb_id, cell_id, mod_id), &report))
}

#[no_mangle]
pub extern "C" fn epp_trigger_macrep_rep(buf: *const c_char, size: c_uint, det: *mut ep_macrep_det) -> c_int {
    match in_buf(buf, size) {
        Some(b) => parsed(parse_trigger_macrep_rep(b), |r| store(det, (&r).into())),
        None => EP_ERROR,
    }
}

#[no_mangle]
pub extern "C" fn epf_trigger_macrep_req(
    buf: *mut c_char,
    size: c_uint,
    enb_id: u32,
    cell_id: u16,
    mod_id: u32,
    interval: u16,
) -> c_int {
    match out_buf(buf, size) {
        Some(b) => formatted(format_trigger_macrep_req(
            b,
            HeaderId::new(enb_id, cell_id, mod_id),
            interval,
        )),
        None => EP_ERROR,
    }
}

#[no_mangle]
pub extern "C" fn epp_trigger_macrep_req(buf: *const c_char, size: c_uint, interval: *mut u16) -> c_int {
    match in_buf(buf, size) {
        Some(b) => parsed(parse_trigger_macrep_req(b), |v| store(interval, v)),
        None => EP_ERROR,
    }
}

// Handover.

#[no_mangle]
pub extern "C" fn epf_single_ho_rep(
    buf: *mut c_char,
    size: c_uint,
    enb_id: u32,
    cell_id: u16,
    mod_id: u32,
    origin_enb: u32,
    origin_pci: u16,
    origin_rnti: u16,
    target_rnti: u16,
) -> c_int {
    match out_buf(buf, size) {
        Some(b) => formatted(format_single_ho_rep(
            b,
            HeaderId::new(enb_id, cell_id, mod_id),
            origin_enb,
            origin_pci,
            origin_rnti,
            target_rnti,
        )),
        None => EP_ERROR,
    }
}

#[no_mangle]
pub extern "C" fn epp_single_ho_rep(
    buf: *const c_char,
    size: c_uint,
    origin_enb: *mut u32,
    origin_pci: *mut u16,
    origin_rnti: *mut u16,
    target_rnti: *mut u16,
) -> c_int {
    let Some(b) = in_buf(buf, size) else {
        return EP_ERROR;
    };
    parsed(parse_single_ho_rep(b), |rep| {
        store(origin_enb, rep.origin_enb);
        store(origin_pci, rep.origin_pci);
        store(origin_rnti, rep.origin_rnti);
        store(target_rnti, rep.target_rnti);
    })
}

#[no_mangle]
pub extern "C" fn epf_single_ho_req(
    buf: *mut c_char,
    size: c_uint,
    enb_id: u32,
    cell_id: u16,
    mod_id: u32,
    rnti: u16,
    enb: u32,
    pci: u16,
    cause: u8,
) -> c_int {
    let (Some(b), Some(cause)) = (out_buf(buf, size), HandoverCause::from_u8(cause)) else {
        return EP_ERROR;
    };
    formatted(format_single_ho_req(
        b,
        HeaderId::new(enb_id, cell_id, mod_id),
        rnti,
        enb,
        pci,
        cause,
    ))
}

#[no_mangle]
pub extern "C" fn epp_single_ho_req(
    buf: *const c_char,
    size: c_uint,
    rnti: *mut u16,
    enb: *mut u32,
    pci: *mut u16,
    cause: *mut u8,
) -> c_int {
    let Some(b) = in_buf(buf, size) else {
        return EP_ERROR;
    };
    parsed(parse_single_ho_req(b), |req| {
        store(rnti, req.rnti);
        store(enb, req.target_enb);
        store(pci, req.target_pci);
        store(cause, req.cause);
    })
}
