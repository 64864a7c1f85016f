use parking_lot::{Condvar, Mutex};
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

#[derive(Default)]
struct State {
    readers: usize,
    writer: bool,
    waiting_writers: usize,
}

/// Multiple-reader, single-writer lock that owns the value it protects.
///
/// [`SharedLock::read`] admits any number of concurrent holders;
/// [`SharedLock::write`] admits exactly one and excludes all readers.
/// Guards release on drop, so every exit path including panics unwinds the
/// holder set. Writers are preferred: once a writer is waiting, new readers
/// queue behind it, and a releasing writer hands off to the next writer if
/// one exists, otherwise wakes the whole reader queue; readers run again as
/// soon as the writer queue empties. Acquisition is not reentrant; callers
/// hold one guard per operation and never nest.
pub struct SharedLock<T> {
    state: Mutex<State>,
    readers_waiting: Condvar,
    writers_waiting: Condvar,
    data: UnsafeCell<T>,
}

// The value is only reachable through the guards, which enforce the
// reader/writer protocol above.
unsafe impl<T: Send> Send for SharedLock<T> {}
unsafe impl<T: Send + Sync> Sync for SharedLock<T> {}

impl<T: Default> Default for SharedLock<T> {
    fn default() -> Self {
        SharedLock::new(T::default())
    }
}

impl<T> SharedLock<T> {
    pub fn new(value: T) -> Self {
        SharedLock {
            state: Mutex::new(State::default()),
            readers_waiting: Condvar::new(),
            writers_waiting: Condvar::new(),
            data: UnsafeCell::new(value),
        }
    }

    /// Acquires shared access, blocking while a writer holds or waits.
    pub fn read(&self) -> ReadGuard<'_, T> {
        let mut state = self.state.lock();
        while state.writer || state.waiting_writers > 0 {
            self.readers_waiting.wait(&mut state);
        }
        state.readers += 1;
        ReadGuard { lock: self }
    }

    /// Acquires exclusive access, blocking until all current holders leave.
    pub fn write(&self) -> WriteGuard<'_, T> {
        let mut state = self.state.lock();
        state.waiting_writers += 1;
        while state.writer || state.readers > 0 {
            self.writers_waiting.wait(&mut state);
        }
        state.waiting_writers -= 1;
        state.writer = true;
        WriteGuard { lock: self }
    }

    /// Exclusive access through a unique reference, no locking required.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

pub struct ReadGuard<'a, T> {
    lock: &'a SharedLock<T>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = self.lock.state.lock();
        state.readers -= 1;
        if state.readers == 0 && state.waiting_writers > 0 {
            self.lock.writers_waiting.notify_one();
        }
    }
}

pub struct WriteGuard<'a, T> {
    lock: &'a SharedLock<T>,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = self.lock.state.lock();
        state.writer = false;
        if state.waiting_writers > 0 {
            self.lock.writers_waiting.notify_one();
        } else {
            self.lock.readers_waiting.notify_all();
        }
    }
}
