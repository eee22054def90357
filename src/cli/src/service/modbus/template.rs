use tokio_modbus::Address;

use super::register::RegisterKind::{Acc32, S16, U16, U32};
use super::register::*;

type R = RegisterTemplate;

/// Default offsets of the three meter blocks SolarEdge inverters expose.
pub(crate) const METER_OFFSETS: [Address; 3] = [40122, 40296, 40470];

/// SunSpec common block and inverter model.
pub(crate) static BASE: &[RegisterTemplate] = &[
  R::new(40001, 2, "C_SunSpec_ID", U32, "Value = \"SunS\" (0x53756e53). Uniquely identifies this as a SunSpec MODBUS Map"),
  R::new(40003, 1, "C_SunSpec_DID", U16, "Value = 0x0001. Uniquely identifies this as a SunSpec Common Model Block"),
  R::new(40004, 1, "C_SunSpec_Length", U16, "65 = Length of block in 16-bit registers"),
  R::new(40005, 16, "C_Manufacturer", string(32), "Value registered with SunSpec = \"SolarEdge \""),
  R::new(40021, 16, "C_Model", string(32), "SolarEdge specific value"),
  R::new(40045, 8, "C_Version", string(16), "SolarEdge specific value"),
  R::new(40053, 16, "C_SerialNumber", string(32), "SolarEdge unique value"),
  R::new(40069, 1, "C_DeviceAddress", U16, "MODBUS Unit ID"),
  R::new(40070, 1, "I_SunSpec_DID", U16, "101 = single phase 102 = split phase 103 = three phase"),
  R::new(40071, 1, "I_SunSpec_Length", U16, "50 = Length of model block"),
  R::new(40072, 1, "I_AC_Current", U16, "Amps AC Total Current value").scaled("I_AC_Current_SF"),
  R::new(40073, 1, "I_AC_CurrentA", U16, "Amps AC Phase A Current value").scaled("I_AC_Current_SF"),
  R::new(40074, 1, "I_AC_CurrentB", U16, "Amps AC Phase B Current value").scaled("I_AC_Current_SF"),
  R::new(40075, 1, "I_AC_CurrentC", U16, "Amps AC Phase C Current value").scaled("I_AC_Current_SF"),
  R::new(40076, 1, "I_AC_Current_SF", S16, "AC Current scale factor"),
  R::new(40077, 1, "I_AC_VoltageAB", U16, "Volts AC Voltage Phase AB value").scaled("I_AC_Voltage_SF"),
  R::new(40078, 1, "I_AC_VoltageBC", U16, "Volts AC Voltage Phase BC value").scaled("I_AC_Voltage_SF"),
  R::new(40079, 1, "I_AC_VoltageCA", U16, "Volts AC Voltage Phase CA value").scaled("I_AC_Voltage_SF"),
  R::new(40080, 1, "I_AC_VoltageAN", U16, "Volts AC Voltage Phase A to N value").scaled("I_AC_Voltage_SF"),
  R::new(40081, 1, "I_AC_VoltageBN", U16, "Volts AC Voltage Phase B to N value").scaled("I_AC_Voltage_SF"),
  R::new(40082, 1, "I_AC_VoltageCN", U16, "Volts AC Voltage Phase C to N value").scaled("I_AC_Voltage_SF"),
  R::new(40083, 1, "I_AC_Voltage_SF", S16, "AC Voltage scale factor"),
  R::new(40084, 1, "I_AC_Power", S16, "Watts AC Power value").scaled("I_AC_Power_SF"),
  R::new(40085, 1, "I_AC_Power_SF", S16, "AC Power scale factor"),
  R::new(40086, 1, "I_AC_Frequency", U16, "Hertz AC Frequency value").scaled("I_AC_Frequency_SF"),
  R::new(40087, 1, "I_AC_Frequency_SF", S16, "Scale factor"),
  R::new(40088, 1, "I_AC_VA", S16, "VA Apparent Power").scaled("I_AC_VA_SF"),
  R::new(40089, 1, "I_AC_VA_SF", S16, "Scale factor"),
  R::new(40090, 1, "I_AC_VAR", S16, "VAR Reactive Power").scaled("I_AC_VAR_SF"),
  R::new(40091, 1, "I_AC_VAR_SF", S16, "Scale factor"),
  R::new(40092, 1, "I_AC_PF", S16, "% Power Factor").scaled("I_AC_PF_SF"),
  R::new(40093, 1, "I_AC_PF_SF", S16, "Scale factor"),
  R::new(40094, 2, "I_AC_Energy_WH", Acc32, "WattHours AC Lifetime Energy production").scaled("I_AC_Energy_WH_SF"),
  R::new(40096, 1, "I_AC_Energy_WH_SF", U16, "Scale factor"),
  R::new(40097, 1, "I_DC_Current", U16, "Amps DC Current value").scaled("I_DC_Current_SF"),
  R::new(40098, 1, "I_DC_Current_SF", S16, "Scale factor"),
  R::new(40099, 1, "I_DC_Voltage", U16, "Volts DC Voltage value").scaled("I_DC_Voltage_SF"),
  R::new(40100, 1, "I_DC_Voltage_SF", S16, "Scale factor"),
  R::new(40101, 1, "I_DC_Power", S16, "Watts DC Power value").scaled("I_DC_Power_SF"),
  R::new(40102, 1, "I_DC_Power_SF", S16, "Scale factor"),
  R::new(40104, 1, "I_Temp_Sink", S16, "Degrees C Heat Sink Temperature").scaled("I_Temp_SF"),
  R::new(40107, 1, "I_Temp_SF", S16, "Scale factor"),
  R::new(40108, 1, "I_Status", U16, "Operating State"),
  R::new(40109, 1, "I_Status_Vendor", U16, "Vendor-defined operating state and error codes"),
  R::new(40110, 2, "I_Event_1", U32, "Not implemented"),
  R::new(40112, 2, "I_Event_2", U32, "Not implemented"),
  R::new(40114, 2, "I_Event_1_Vendor", U32, "Vendor defined events bitmask: 0x1 - Off-grid"),
  R::new(40116, 2, "I_Event_2_Vendor", U32, "Not implemented"),
  R::new(40118, 2, "I_Event_3_Vendor", U32, "Not implemented"),
  R::new(40120, 2, "I_Event_4_Vendor", U32, "Inverter LCD error 3x2 reads as 0x03000002"),
];

/// SunSpec common block and meter model relative to the meter offset.
pub(crate) static METER: &[RegisterTemplate] = &[
  R::new(0, 1, "C_SunSpec_DID", U16, "Value = 0x0001. Uniquely identifies this as a SunSpec Common Model Block"),
  R::new(1, 1, "C_SunSpec_Length", U16, "65 = Length of block in 16-bit registers"),
  R::new(2, 16, "C_Manufacturer", string(32), "Meter manufacturer"),
  R::new(18, 16, "C_Model", string(32), "Meter model"),
  R::new(34, 8, "C_Option", string(16), "Export + Import, Production, consumption"),
  R::new(42, 8, "C_Version", string(16), "Meter version"),
  R::new(50, 16, "C_SerialNumber", string(32), "Meter serial number"),
  R::new(66, 1, "C_DeviceAddress", U16, "Inverter Modbus ID"),
  R::new(67, 1, "M_SunSpec_DID", U16, "201 = single phase 202 = split phase 203 = wye 204 = delta"),
  R::new(68, 1, "M_SunSpec_Length", U16, "105 = Length of model block"),
  R::new(69, 1, "M_AC_Current", S16, "Amps AC Current").scaled("M_AC_Current_SF"),
  R::new(70, 1, "M_AC_Current_A", S16, "Amps Phase A Current").scaled("M_AC_Current_SF"),
  R::new(71, 1, "M_AC_Current_B", S16, "Amps Phase B Current").scaled("M_AC_Current_SF"),
  R::new(72, 1, "M_AC_Current_C", S16, "Amps Phase C Current").scaled("M_AC_Current_SF"),
  R::new(73, 1, "M_AC_Current_SF", S16, "Current scale factor"),
  R::new(74, 1, "M_AC_Voltage_LN", S16, "Volts Line to Neutral AC Voltage (average of active phases)").scaled("M_AC_Voltage_SF"),
  R::new(75, 1, "M_AC_Voltage_AN", S16, "Volts Phase A to Neutral AC Voltage").scaled("M_AC_Voltage_SF"),
  R::new(76, 1, "M_AC_Voltage_BN", S16, "Volts Phase B to Neutral AC Voltage").scaled("M_AC_Voltage_SF"),
  R::new(77, 1, "M_AC_Voltage_CN", S16, "Volts Phase C to Neutral AC Voltage").scaled("M_AC_Voltage_SF"),
  R::new(78, 1, "M_AC_Voltage_LL", S16, "Volts Line to Line AC Voltage (average of active phases)").scaled("M_AC_Voltage_SF"),
  R::new(79, 1, "M_AC_Voltage_AB", S16, "Volts Phase A to Phase B AC Voltage").scaled("M_AC_Voltage_SF"),
  R::new(80, 1, "M_AC_Voltage_BC", S16, "Volts Phase B to Phase C AC Voltage").scaled("M_AC_Voltage_SF"),
  R::new(81, 1, "M_AC_Voltage_CA", S16, "Volts Phase C to Phase A AC Voltage").scaled("M_AC_Voltage_SF"),
  R::new(82, 1, "M_AC_Voltage_SF", S16, "Voltage scale factor"),
  R::new(83, 1, "M_AC_Freq", S16, "Herts AC Frequency").scaled("M_AC_Freq_SF"),
  R::new(84, 1, "M_AC_Freq_SF", S16, "Frequency scale factor"),
  R::new(85, 1, "M_AC_Power", S16, "Watts Total Real Power").scaled("M_AC_Power_SF"),
  R::new(86, 1, "M_AC_Power_A", S16, "Watts Phase A Real Power").scaled("M_AC_Power_SF"),
  R::new(87, 1, "M_AC_Power_B", S16, "Watts Phase B Real Power").scaled("M_AC_Power_SF"),
  R::new(88, 1, "M_AC_Power_C", S16, "Watts Phase C Real Power").scaled("M_AC_Power_SF"),
  R::new(89, 1, "M_AC_Power_SF", S16, "Real Power scale factor"),
  R::new(90, 1, "M_AC_VA", S16, "VA Total Apparent Power").scaled("M_AC_VA_SF"),
  R::new(91, 1, "M_AC_VA_A", S16, "VA Phase A Apparent Power").scaled("M_AC_VA_SF"),
  R::new(92, 1, "M_AC_VA_B", S16, "VA Phase B Apparent Power").scaled("M_AC_VA_SF"),
  R::new(93, 1, "M_AC_VA_C", S16, "VA Phase C Apparent Power").scaled("M_AC_VA_SF"),
  R::new(94, 1, "M_AC_VA_SF", S16, "Apparent Power scale factor"),
  R::new(95, 1, "M_AC_VAR", S16, "VAR Total Reactive Power").scaled("M_AC_VAR_SF"),
  R::new(96, 1, "M_AC_VAR_A", S16, "VAR Phase A Reactive Power").scaled("M_AC_VAR_SF"),
  R::new(97, 1, "M_AC_VAR_B", S16, "VAR Phase B Reactive Power").scaled("M_AC_VAR_SF"),
  R::new(98, 1, "M_AC_VAR_C", S16, "VAR Phase C Reactive Power").scaled("M_AC_VAR_SF"),
  R::new(99, 1, "M_AC_VAR_SF", S16, "Reactive Power scale factor"),
  R::new(100, 1, "M_AC_PF", S16, "% Average Power Factor").scaled("M_AC_PF_SF"),
  R::new(101, 1, "M_AC_PF_A", S16, "% Phase A Power Factor").scaled("M_AC_PF_SF"),
  R::new(102, 1, "M_AC_PF_B", S16, "% Phase B Power Factor").scaled("M_AC_PF_SF"),
  R::new(103, 1, "M_AC_PF_C", S16, "% Phase C Power Factor").scaled("M_AC_PF_SF"),
  R::new(104, 1, "M_AC_PF_SF", S16, "Power Factor scale factor"),
  R::new(105, 2, "M_Exported", Acc32, "Wh Total Exported Real Energy").scaled("M_Energy_W_SF"),
  R::new(107, 2, "M_Exported_A", Acc32, "Wh Phase A Exported Real Energy").scaled("M_Energy_W_SF"),
  R::new(109, 2, "M_Exported_B", Acc32, "Wh Phase B Exported Real Energy").scaled("M_Energy_W_SF"),
  R::new(111, 2, "M_Exported_C", Acc32, "Wh Phase C Exported Real Energy").scaled("M_Energy_W_SF"),
  R::new(113, 2, "M_Imported", Acc32, "Wh Total Imported Real Energy").scaled("M_Energy_W_SF"),
  R::new(115, 2, "M_Imported_A", Acc32, "Wh Phase A Imported Real Energy").scaled("M_Energy_W_SF"),
  R::new(117, 2, "M_Imported_B", Acc32, "Wh Phase B Imported Real Energy").scaled("M_Energy_W_SF"),
  R::new(119, 2, "M_Imported_C", Acc32, "Wh Phase C Imported Real Energy").scaled("M_Energy_W_SF"),
  R::new(121, 1, "M_Energy_W_SF", S16, "Real Energy scale factor"),
  R::new(122, 2, "M_Exported_VA", Acc32, "VAh Total Exported Apparent Energy").scaled("M_Energy_VA_SF"),
  R::new(124, 2, "M_Exported_VA_A", Acc32, "VAh Phase A Exported Apparent Energy").scaled("M_Energy_VA_SF"),
  R::new(126, 2, "M_Exported_VA_B", Acc32, "VAh Phase B Exported Apparent Energy").scaled("M_Energy_VA_SF"),
  R::new(128, 2, "M_Exported_VA_C", Acc32, "VAh Phase C Exported Apparent Energy").scaled("M_Energy_VA_SF"),
  R::new(130, 2, "M_Imported_VA", Acc32, "VAh Total Imported Apparent Energy").scaled("M_Energy_VA_SF"),
  R::new(132, 2, "M_Imported_VA_A", Acc32, "VAh Phase A Imported Apparent Energy").scaled("M_Energy_VA_SF"),
  R::new(134, 2, "M_Imported_VA_B", Acc32, "VAh Phase B Imported Apparent Energy").scaled("M_Energy_VA_SF"),
  R::new(136, 2, "M_Imported_VA_C", Acc32, "VAh Phase C Imported Apparent Energy").scaled("M_Energy_VA_SF"),
  R::new(138, 1, "M_Energy_VA_SF", S16, "Apparent Energy scale factor"),
  R::new(139, 2, "M_Import_VARh_Q1", Acc32, "VARh Quadrant 1 Imported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(141, 2, "M_Import_VARh_Q1A", Acc32, "VARh Phase A Quadrant 1 Imported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(143, 2, "M_Import_VARh_Q1B", Acc32, "VARh Phase B Quadrant 1 Imported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(145, 2, "M_Import_VARh_Q1C", Acc32, "VARh Phase C Quadrant 1 Imported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(147, 2, "M_Import_VARh_Q2", Acc32, "VARh Quadrant 2 Imported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(149, 2, "M_Import_VARh_Q2A", Acc32, "VARh Phase A Quadrant 2 Imported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(151, 2, "M_Import_VARh_Q2B", Acc32, "VARh Phase B Quadrant 2 Imported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(153, 2, "M_Import_VARh_Q2C", Acc32, "VARh Phase C Quadrant 2 Imported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(155, 2, "M_Export_VARh_Q3", Acc32, "VARh Quadrant 3 Exported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(157, 2, "M_Export_VARh_Q3A", Acc32, "VARh Phase A Quadrant 3 Exported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(159, 2, "M_Export_VARh_Q3B", Acc32, "VARh Phase B Quadrant 3 Exported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(161, 2, "M_Export_VARh_Q3C", Acc32, "VARh Phase C Quadrant 3 Exported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(163, 2, "M_Export_VARh_Q4", Acc32, "VARh Quadrant 4 Exported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(165, 2, "M_Export_VARh_Q4A", Acc32, "VARh Phase A Quadrant 4 Exported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(167, 2, "M_Export_VARh_Q4B", Acc32, "VARh Phase B Quadrant 4 Exported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(169, 2, "M_Export_VARh_Q4C", Acc32, "VARh Phase C Quadrant 4 Exported Reactive Energy").scaled("M_Energy_VAR_SF"),
  R::new(171, 1, "M_Energy_VAR_SF", S16, "Reactive Energy scale factor"),
  R::new(172, 2, "M_Events", U32, "See M_EVENT_ flags. 0 = nothing to report"),
];
